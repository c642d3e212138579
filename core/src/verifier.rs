// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Binding Verifier
//!
//! Compares what was declared (an interface and a set of ports) with what the
//! host is actually doing (listening sockets and firewall grants).
//!
//! The checks run in a fixed order and every one of them runs; the report's
//! status is the first category that produced a finding:
//!
//! 1. **service-down**: nothing listens on the primary port.
//! 2. **listening-too-broad**: a declared port is bound to the wildcard address
//!    although a specific interface was declared.
//! 3. **listening-too-narrow**: a declared port has listeners, but none on an
//!    address of the declared interface or on the wildcard.
//! 4. **firewall-rule-missing**: the active backend does not allow a declared
//!    port on the declared interface.
//!
//! The verifier is pure. Identical inputs give identical reports.

use sambind_common::models::binding::{
    BindingState, DiscrepancyReport, DiscrepancyStatus, Finding,
};
use sambind_common::models::firewall::{FirewallBackend, RuleIntent, RuleOutcome};

pub fn verify(
    state: &BindingState,
    intent: &RuleIntent,
    firewall: &RuleOutcome,
) -> DiscrepancyReport {
    let mut findings = Vec::new();

    service_down(state, intent, &mut findings);
    too_broad(state, &mut findings);
    too_narrow(state, &mut findings);
    firewall_missing(state, intent, firewall, &mut findings);

    DiscrepancyReport::from_findings(findings)
}

fn service_down(state: &BindingState, intent: &RuleIntent, findings: &mut Vec<Finding>) {
    let primary = intent.primary;
    let listening = state
        .sockets_on(primary.port)
        .any(|s| s.transport == primary.transport);
    if !listening {
        findings.push(Finding {
            category: DiscrepancyStatus::ServiceDown,
            message: format!("nothing is listening on {primary}"),
        });
    }
}

fn too_broad(state: &BindingState, findings: &mut Vec<Finding>) {
    let iface = &state.declared_interface;
    if iface.is_wildcard() {
        return;
    }
    for port in &state.declared_ports {
        for socket in state.sockets_on(*port).filter(|s| s.address.is_unspecified()) {
            findings.push(Finding {
                category: DiscrepancyStatus::ListeningTooBroad,
                message: format!(
                    "{socket} accepts connections on every interface, not only {}",
                    iface.name
                ),
            });
        }
    }
}

fn too_narrow(state: &BindingState, findings: &mut Vec<Finding>) {
    let iface = &state.declared_interface;
    for port in &state.declared_ports {
        let sockets: Vec<_> = state.sockets_on(*port).collect();
        if sockets.is_empty() {
            continue;
        }
        let reachable = sockets
            .iter()
            .any(|s| s.address.is_unspecified() || iface.owns(s.address));
        if reachable {
            continue;
        }
        let bound: Vec<String> = sockets.iter().map(|s| s.address.to_string()).collect();
        findings.push(Finding {
            category: DiscrepancyStatus::ListeningTooNarrow,
            message: format!(
                "port {port} is only bound to {} while {} was declared",
                bound.join(", "),
                iface.label()
            ),
        });
    }
}

fn firewall_missing(
    state: &BindingState,
    intent: &RuleIntent,
    firewall: &RuleOutcome,
    findings: &mut Vec<Finding>,
) {
    if firewall.backend == FirewallBackend::NoneDetected {
        return;
    }
    let iface = &state.declared_interface.name;
    let zone = firewall
        .effective_zone(iface)
        .map(|z| format!(" (zone {z})"))
        .unwrap_or_default();

    for port in intent
        .ports
        .iter()
        .filter(|p| state.declared_ports.contains(&p.port))
    {
        if !firewall.covers(*port, iface) {
            findings.push(Finding {
                category: DiscrepancyStatus::FirewallRuleMissing,
                message: format!(
                    "{} does not allow {port} on {iface}{zone}",
                    firewall.backend
                ),
            });
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
