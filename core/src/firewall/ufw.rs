// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! ufw backend. No zones; every rule applies to all interfaces.

use sambind_common::models::firewall::{
    FirewallBackend, PortSpec, RuleIntent, RuleOutcome, ZoneScope,
};
use sambind_common::models::interface::NetworkInterface;
use sambind_common::system::CommandRunner;

use super::FirewallHandler;

const CMD: &str = "ufw";

/// Application profile shipped with the samba package.
const APP_PROFILE: &str = "Samba";

pub struct Ufw<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Ufw<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

impl FirewallHandler for Ufw<'_> {
    fn backend(&self) -> FirewallBackend {
        FirewallBackend::Ufw
    }

    fn apply(&self, intent: &RuleIntent, _iface: &NetworkInterface) -> RuleOutcome {
        let mut outcome = RuleOutcome::new(FirewallBackend::Ufw);

        for port in &intent.ports {
            let rule = port.to_string();
            outcome.attempted += 1;
            match self.runner.run(CMD, &["allow", rule.as_str()]) {
                Ok(out) if out.success() => outcome.grant(*port, ZoneScope::Global),
                Ok(out) => outcome
                    .errors
                    .push(format!("ufw allow {rule}: {}", out.reason())),
                Err(e) => outcome.errors.push(format!("ufw allow {rule}: {e}")),
            }
        }

        outcome
    }

    fn observe(&self, intent: &RuleIntent, _iface: &NetworkInterface) -> anyhow::Result<RuleOutcome> {
        let out = self.runner.run(CMD, &["status"])?;
        if !out.success() {
            anyhow::bail!("ufw status: {}", out.reason());
        }

        let mut outcome = RuleOutcome::new(FirewallBackend::Ufw);
        for allowed in parse_status(&out.stdout) {
            match allowed {
                Allowed::Port(port) if intent.ports.contains(&port) => {
                    outcome.grant(port, ZoneScope::Global);
                }
                Allowed::Profile(name) if name.eq_ignore_ascii_case(APP_PROFILE) => {
                    for port in &intent.ports {
                        outcome.grant(*port, ZoneScope::Global);
                    }
                }
                _ => {}
            }
        }
        Ok(outcome)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allowed {
    Port(PortSpec),
    Profile(String),
}

/// Extracts the ALLOW rules from `ufw status`:
///
/// ```text
/// Status: active
///
/// To                         Action      From
/// --                         ------      ----
/// 445/tcp                    ALLOW       Anywhere
/// 139                        ALLOW       Anywhere
/// 137:138/udp                ALLOW       Anywhere
/// Samba                      ALLOW       Anywhere
/// 445/tcp (v6)               ALLOW       Anywhere (v6)
/// ```
pub fn parse_status(stdout: &str) -> Vec<Allowed> {
    let mut allowed = Vec::new();
    for line in stdout.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(action) = tokens.iter().position(|t| *t == "ALLOW") else {
            continue;
        };
        if action == 0 {
            continue;
        }
        let target = tokens[0];
        if target.starts_with(|c: char| c.is_ascii_digit()) {
            allowed.extend(parse_port_target(target).into_iter().map(Allowed::Port));
        } else {
            allowed.push(Allowed::Profile(target.to_string()));
        }
    }
    allowed
}

/// Expands a ufw port target: `445`, `445/tcp`, `137,138/udp` or `137:138/udp`.
/// Without a protocol the rule covers tcp and udp.
pub fn parse_port_target(target: &str) -> Vec<PortSpec> {
    let (list, protos): (&str, &[&str]) = match target.split_once('/') {
        Some((list, "tcp")) => (list, &["tcp"][..]),
        Some((list, "udp")) => (list, &["udp"][..]),
        Some(_) => return Vec::new(),
        None => (target, &["tcp", "udp"][..]),
    };

    let mut ports = Vec::new();
    for item in list.split(',') {
        let (lo, hi) = item.split_once(':').unwrap_or((item, item));
        let (Ok(lo), Ok(hi)) = (lo.parse::<u16>(), hi.parse::<u16>()) else {
            continue;
        };
        for port in lo..=hi {
            for proto in protos {
                if let Some(spec) = PortSpec::parse(&format!("{port}/{proto}")) {
                    ports.push(spec);
                }
            }
        }
    }
    ports
}

#[cfg(test)]
mod tests {
    use sambind_common::models::interface::InterfaceKind;
    use sambind_common::system::CommandOutput;

    use super::*;
    use crate::firewall::testing::FakeRunner;

    const STATUS: &str = "Status: active\n\nTo                         Action      From\n--                         ------      ----\n22/tcp                     ALLOW       Anywhere\n445/tcp                    ALLOW       Anywhere\n137/udp                    ALLOW       Anywhere\n445/tcp (v6)               ALLOW       Anywhere (v6)\n";

    fn eth0() -> NetworkInterface {
        NetworkInterface::new(
            "eth0",
            vec!["10.0.0.5/24".parse().unwrap()],
            true,
            InterfaceKind::Physical,
        )
    }

    #[test]
    fn status_lines_are_parsed() {
        let allowed = parse_status(STATUS);
        assert!(allowed.contains(&Allowed::Port(PortSpec::tcp(22))));
        assert!(allowed.contains(&Allowed::Port(PortSpec::udp(137))));
        assert!(!allowed.iter().any(|a| matches!(a, Allowed::Profile(p) if p == "To")));
    }

    #[test]
    fn apply_opens_each_port_globally() {
        let runner = FakeRunner::default();
        let outcome = Ufw::new(&runner).apply(&RuleIntent::samba(), &eth0());

        assert!(runner.called("ufw allow 445/tcp"));
        assert!(runner.called("ufw allow 138/udp"));
        assert_eq!(outcome.attempted, 4);
        assert!(outcome.covers(PortSpec::tcp(139), "anything"));
    }

    #[test]
    fn observe_counts_only_intent_ports() {
        let runner = FakeRunner::default().answer("ufw status", CommandOutput::ok(STATUS));
        let outcome = Ufw::new(&runner).observe(&RuleIntent::samba(), &eth0()).unwrap();

        assert!(outcome.covers(PortSpec::tcp(445), "eth0"));
        assert!(outcome.covers(PortSpec::udp(137), "eth0"));
        assert!(!outcome.covers(PortSpec::tcp(139), "eth0"));
        assert_eq!(outcome.grants.len(), 2);
    }

    #[test]
    fn bare_port_opens_both_transports() {
        assert_eq!(
            parse_port_target("445"),
            vec![PortSpec::tcp(445), PortSpec::udp(445)]
        );
    }

    #[test]
    fn port_ranges_and_lists_expand() {
        assert_eq!(
            parse_port_target("137:138/udp"),
            vec![PortSpec::udp(137), PortSpec::udp(138)]
        );
        assert_eq!(
            parse_port_target("139,445/tcp"),
            vec![PortSpec::tcp(139), PortSpec::tcp(445)]
        );
        assert!(parse_port_target("445/sctp").is_empty());
    }

    #[test]
    fn observe_understands_every_port_form() {
        let runner = FakeRunner::default().answer(
            "ufw status",
            CommandOutput::ok(
                "Status: active\n445                        ALLOW       Anywhere\n139                        ALLOW       Anywhere\n137:138/udp                ALLOW       Anywhere\n",
            ),
        );
        let outcome = Ufw::new(&runner).observe(&RuleIntent::samba(), &eth0()).unwrap();

        assert!(outcome.covers(PortSpec::tcp(445), "eth0"));
        assert!(outcome.covers(PortSpec::tcp(139), "eth0"));
        assert!(outcome.covers(PortSpec::udp(137), "eth0"));
        assert!(outcome.covers(PortSpec::udp(138), "eth0"));
        assert_eq!(outcome.grants.len(), 4);
    }

    #[test]
    fn samba_profile_covers_every_port() {
        let runner = FakeRunner::default().answer(
            "ufw status",
            CommandOutput::ok("Status: active\nSamba                      ALLOW       Anywhere\n"),
        );
        let outcome = Ufw::new(&runner).observe(&RuleIntent::samba(), &eth0()).unwrap();
        assert_eq!(outcome.grants.len(), 4);
    }
}
