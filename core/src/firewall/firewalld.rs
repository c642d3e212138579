// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! firewalld backend.
//!
//! Rules are zone scoped. The zone governing an interface is the zone it is
//! explicitly bound to, or the default zone when it is bound nowhere. Bridges
//! created by libvirt sit in the `libvirt` zone, so a binding on such a bridge
//! also opens the ports there.
//!
//! Every rule is added twice, once to the runtime configuration and once with
//! `--permanent`, then the daemon is reloaded.

use std::collections::BTreeSet;

use sambind_common::debug;
use sambind_common::models::firewall::{
    FirewallBackend, FirewallZone, PortSpec, RuleIntent, RuleOutcome, ZoneScope,
};
use sambind_common::models::interface::NetworkInterface;
use sambind_common::system::CommandRunner;

use super::FirewallHandler;

const CMD: &str = "firewall-cmd";

/// Zone libvirt assigns to its bridges.
pub const VIRTUALIZATION_ZONE: &str = "libvirt";

pub struct Firewalld<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Firewalld<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn query(&self, args: &[&str]) -> Option<String> {
        match self.runner.run(CMD, args) {
            Ok(out) if out.success() => Some(out.stdout.trim().to_string()),
            _ => None,
        }
    }

    /// Runs a mutating command and returns a readable error on failure.
    fn change(&self, args: &[&str]) -> Result<(), String> {
        let describe = |reason: String| format!("{CMD} {}: {reason}", args.join(" "));
        match self.runner.run(CMD, args) {
            Ok(out) if out.success() => Ok(()),
            Ok(out) => Err(describe(out.reason())),
            Err(e) => Err(describe(e.to_string())),
        }
    }

    fn bound_zone(&self, iface: &str) -> Option<String> {
        let arg = format!("--get-zone-of-interface={iface}");
        self.query(&[arg.as_str()]).filter(|z| !z.is_empty())
    }

    /// Zones to open ports in, in the order they are touched.
    fn target_zones(
        &self,
        intent: &RuleIntent,
        iface: &NetworkInterface,
        outcome: &mut RuleOutcome,
    ) -> Vec<String> {
        if !intent.target_zones.is_empty() {
            return intent.target_zones.iter().cloned().collect();
        }

        let mut zones = Vec::new();
        match self.bound_zone(&iface.name) {
            Some(zone) => {
                outcome
                    .zones
                    .push(FirewallZone::new(&zone).with_interface(&iface.name));
                zones.push(zone);
            }
            None => {
                if let Some(default) = outcome.default_zone.clone() {
                    zones.push(default);
                }
            }
        }

        if iface.is_virtualization_bridge() {
            let known = self
                .query(&["--get-zones"])
                .map(|z| z.split_whitespace().any(|name| name == VIRTUALIZATION_ZONE))
                .unwrap_or(false);
            if known && !zones.iter().any(|z| z == VIRTUALIZATION_ZONE) {
                zones.push(VIRTUALIZATION_ZONE.to_string());
            }
        }
        zones
    }

    /// Adds the service or port in both runtime and permanent configuration.
    fn add_both(&self, zone: &str, flag: &str, outcome: &mut RuleOutcome) -> Added {
        let zone_arg = format!("--zone={zone}");
        let mut added = Added::default();
        for permanent in [false, true] {
            let mut args = vec![zone_arg.as_str(), flag];
            if permanent {
                args.push("--permanent");
            }
            outcome.attempted += 1;
            match self.change(&args) {
                Ok(()) if permanent => added.permanent = true,
                Ok(()) => added.runtime = true,
                Err(e) => outcome.errors.push(e),
            }
        }
        added
    }
}

/// Which halves of a runtime + permanent pair took effect.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Added {
    runtime: bool,
    permanent: bool,
}

impl Added {
    fn or(self, other: Added) -> Added {
        Added {
            runtime: self.runtime || other.runtime,
            permanent: self.permanent || other.permanent,
        }
    }

    /// A reload replaces the runtime set with the permanent one.
    fn survives(self, reloaded: bool) -> bool {
        if reloaded {
            self.permanent
        } else {
            self.runtime
        }
    }
}

impl FirewallHandler for Firewalld<'_> {
    fn backend(&self) -> FirewallBackend {
        FirewallBackend::Firewalld
    }

    fn apply(&self, intent: &RuleIntent, iface: &NetworkInterface) -> RuleOutcome {
        let mut outcome = RuleOutcome::new(FirewallBackend::Firewalld);
        outcome.default_zone = self.query(&["--get-default-zone"]);

        let zones = self.target_zones(intent, iface, &mut outcome);
        if zones.is_empty() {
            outcome
                .errors
                .push(format!("no firewalld zone governs {}", iface.name));
            return outcome;
        }

        let mut pending: Vec<(PortSpec, ZoneScope, Added)> = Vec::new();
        for zone in &zones {
            debug!(verbosity = 1, "Opening SMB ports in firewalld zone {zone}");
            let scope = ZoneScope::Zone(zone.clone());

            let service = match &intent.service_name {
                Some(service) => {
                    self.add_both(zone, &format!("--add-service={service}"), &mut outcome)
                }
                None => Added::default(),
            };

            for port in &intent.ports {
                let added = self.add_both(zone, &format!("--add-port={port}"), &mut outcome);
                pending.push((*port, scope.clone(), added.or(service)));
            }
        }

        outcome.attempted += 1;
        let reloaded = match self.change(&["--reload"]) {
            Ok(()) => true,
            Err(e) => {
                outcome.errors.push(e);
                false
            }
        };

        for (port, scope, added) in pending {
            if added.survives(reloaded) {
                outcome.grant(port, scope);
            } else if added.runtime {
                outcome
                    .warnings
                    .push(format!("{port} was dropped by the reload, it is not permanent"));
            }
        }

        outcome
    }

    fn observe(&self, intent: &RuleIntent, iface: &NetworkInterface) -> anyhow::Result<RuleOutcome> {
        let mut outcome = RuleOutcome::new(FirewallBackend::Firewalld);
        outcome.default_zone = self.query(&["--get-default-zone"]);

        let active = self.runner.run(CMD, &["--get-active-zones"])?;
        outcome.zones = parse_active_zones(&active.stdout);

        let mut zones: BTreeSet<String> = outcome.zones.iter().map(|z| z.name.clone()).collect();
        if let Some(default) = &outcome.default_zone {
            zones.insert(default.clone());
        }
        if iface.is_virtualization_bridge() {
            zones.insert(VIRTUALIZATION_ZONE.to_string());
        }

        for zone in zones {
            let zone_arg = format!("--zone={zone}");
            let scope = ZoneScope::Zone(zone.clone());

            if let (Some(service), Some(services)) = (
                &intent.service_name,
                self.query(&[zone_arg.as_str(), "--list-services"]),
            ) {
                if services.split_whitespace().any(|s| s == service) {
                    for port in &intent.ports {
                        outcome.grant(*port, scope.clone());
                    }
                }
            }

            if let Some(ports) = self.query(&[zone_arg.as_str(), "--list-ports"]) {
                for port in parse_port_list(&ports) {
                    if intent.ports.contains(&port) {
                        outcome.grant(port, scope.clone());
                    }
                }
            }
        }

        Ok(outcome)
    }
}

/// Parses `firewall-cmd --get-active-zones`:
///
/// ```text
/// libvirt
///   interfaces: virbr0
/// public (default)
///   interfaces: eth0 wlan0
/// ```
pub fn parse_active_zones(stdout: &str) -> Vec<FirewallZone> {
    let mut zones: Vec<FirewallZone> = Vec::new();
    for line in stdout.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            if let Some(name) = line.split_whitespace().next() {
                zones.push(FirewallZone::new(name));
            }
            continue;
        }
        let Some((key, values)) = line.trim().split_once(':') else {
            continue;
        };
        if key != "interfaces" {
            continue;
        }
        if let Some(zone) = zones.last_mut() {
            zone.interfaces
                .extend(values.split_whitespace().map(str::to_string));
        }
    }
    zones
}

/// Parses a whitespace separated `--list-ports` answer such as `445/tcp 137-138/udp`.
/// Ranges are expanded.
pub fn parse_port_list(raw: &str) -> Vec<PortSpec> {
    let mut ports = Vec::new();
    for token in raw.split_whitespace() {
        let Some((range, proto)) = token.split_once('/') else {
            continue;
        };
        let (lo, hi) = match range.split_once('-') {
            Some((lo, hi)) => (lo, hi),
            None => (range, range),
        };
        let (Ok(lo), Ok(hi)) = (lo.parse::<u16>(), hi.parse::<u16>()) else {
            continue;
        };
        for port in lo..=hi {
            if let Some(spec) = PortSpec::parse(&format!("{port}/{proto}")) {
                ports.push(spec);
            }
        }
    }
    ports
}
