// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Raw iptables backend.
//!
//! Rules are inserted at the top of the INPUT chain after checking with `-C`
//! that an identical rule is not already there, so repeated runs do not stack
//! duplicates. Nothing is persisted: the rules are gone after a reboot unless
//! the operator saves them.

use sambind_common::models::firewall::{
    FirewallBackend, PortSpec, RuleIntent, RuleOutcome, Transport, ZoneScope,
};
use sambind_common::models::interface::NetworkInterface;
use sambind_common::system::CommandRunner;

use super::FirewallHandler;

const CMD: &str = "iptables";
const CHAIN: &str = "INPUT";

pub const PERSISTENCE_WARNING: &str =
    "iptables rules are not persistent; save them with iptables-save or netfilter-persistent";

pub struct Iptables<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Iptables<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn rule_exists(&self, rule: &[&str]) -> bool {
        let mut args = vec!["-C", CHAIN];
        args.extend_from_slice(rule);
        matches!(self.runner.run(CMD, &args), Ok(out) if out.success())
    }

    fn insert(&self, rule: &[&str]) -> Result<(), String> {
        let mut args = vec!["-I", CHAIN, "1"];
        args.extend_from_slice(rule);
        match self.runner.run(CMD, &args) {
            Ok(out) if out.success() => Ok(()),
            Ok(out) => Err(format!("{CMD} {}: {}", args.join(" "), out.reason())),
            Err(e) => Err(format!("{CMD} {}: {e}", args.join(" "))),
        }
    }
}

fn proto(transport: Transport) -> &'static str {
    match transport {
        Transport::Tcp => "tcp",
        Transport::Udp => "udp",
    }
}

impl FirewallHandler for Iptables<'_> {
    fn backend(&self) -> FirewallBackend {
        FirewallBackend::Iptables
    }

    fn apply(&self, intent: &RuleIntent, _iface: &NetworkInterface) -> RuleOutcome {
        let mut outcome = RuleOutcome::new(FirewallBackend::Iptables);

        for port in &intent.ports {
            let dport = port.port.to_string();
            let rule = ["-p", proto(port.transport), "--dport", dport.as_str(), "-j", "ACCEPT"];

            outcome.attempted += 1;
            if self.rule_exists(&rule) {
                outcome.grant(*port, ZoneScope::Global);
                continue;
            }
            match self.insert(&rule) {
                Ok(()) => outcome.grant(*port, ZoneScope::Global),
                Err(e) => outcome.errors.push(e),
            }
        }

        outcome.warnings.push(PERSISTENCE_WARNING.to_string());
        outcome
    }

    fn observe(&self, intent: &RuleIntent, iface: &NetworkInterface) -> anyhow::Result<RuleOutcome> {
        let out = self.runner.run(CMD, &["-S", CHAIN])?;
        if !out.success() {
            anyhow::bail!("iptables -S {CHAIN}: {}", out.reason());
        }

        let mut outcome = RuleOutcome::new(FirewallBackend::Iptables);
        let listing = parse_rules(&out.stdout, &iface.name);
        for port in &intent.ports {
            if listing.policy_accepts || listing.accepted.contains(port) {
                outcome.grant(*port, ZoneScope::Global);
            }
        }
        Ok(outcome)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChainListing {
    /// The chain's default policy lets everything through.
    pub policy_accepts: bool,
    pub accepted: Vec<PortSpec>,
}

/// Reads ACCEPT rules out of `iptables -S INPUT`. Rules pinned to a different
/// input interface are ignored; rules limited by source address are not.
pub fn parse_rules(stdout: &str, iface: &str) -> ChainListing {
    let mut listing = ChainListing::default();

    for line in stdout.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["-P", CHAIN, policy, ..] => {
                listing.policy_accepts = *policy == "ACCEPT";
            }
            ["-A", CHAIN, rest @ ..] => {
                if let Some(port) = accepted_port(rest, iface) {
                    listing.accepted.push(port);
                }
            }
            _ => {}
        }
    }
    listing
}

fn accepted_port(tokens: &[&str], iface: &str) -> Option<PortSpec> {
    let value = |flag: &str| {
        tokens
            .iter()
            .position(|t| *t == flag)
            .and_then(|i| tokens.get(i + 1).copied())
    };

    if value("-j") != Some("ACCEPT") {
        return None;
    }
    if let Some(bound) = value("-i") {
        if bound != iface {
            return None;
        }
    }
    let port: u16 = value("--dport")?.parse().ok()?;
    match value("-p")? {
        "tcp" => Some(PortSpec::tcp(port)),
        "udp" => Some(PortSpec::udp(port)),
        _ => None,
    }
}
