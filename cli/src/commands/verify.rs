// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::fs;

use anyhow::{Context, bail};
use colored::*;

use sambind_common::error::ProvisionError;
use sambind_common::models::binding::{DiscrepancyReport, DiscrepancyStatus};
use sambind_common::models::firewall::{FirewallBackend, RuleIntent, RuleOutcome};
use sambind_common::models::interface::NetworkInterface;
use sambind_common::models::protocol::ProtocolVersion;
use sambind_common::{finding, success, warn};
use sambind_core::firewall::Detection;
use sambind_core::provision::verify_existing;
use sambind_core::system::{self, HostSystem};

use crate::terminal::{
    colors,
    print::{self, Print},
};

pub fn verify(interface: &str, protocol: Option<ProtocolVersion>) -> anyhow::Result<()> {
    let host = HostSystem::new();
    let result = verify_existing(host.collaborators(), interface)?;

    print_firewall(&result.detection, &result.firewall, &result.interface);
    print_report(&result.report);

    if let Some(expected) = protocol {
        check_protocol(expected)?;
    }

    if !result.report.is_reachable() {
        return Err(ProvisionError::ServiceDownAfterConfig {
            port: RuleIntent::samba().primary.port,
        }
        .into());
    }
    Ok(())
}

fn check_protocol(expected: ProtocolVersion) -> anyhow::Result<()> {
    let text = fs::read_to_string(system::CONFIG_PATH)
        .with_context(|| format!("failed to read {}", system::CONFIG_PATH))?;
    match system::configured_protocol(&text) {
        Some(found) if found == expected => {
            success!("Protocol range is {found}");
            Ok(())
        }
        Some(found) => bail!("configuration negotiates {found}, expected {expected}"),
        None => bail!("configuration does not pin a protocol range, expected {expected}"),
    }
}

pub(crate) fn print_firewall(detection: &Detection, outcome: &RuleOutcome, iface: &NetworkInterface) {
    Print::header("firewall");
    print::aligned_line("Backend", detection.selected.to_string());
    if detection.is_ambiguous() {
        let others: Vec<String> = detection.also_active.iter().map(|b| b.to_string()).collect();
        print::aligned_line("Untouched", others.join(", ").yellow());
    }
    if detection.selected == FirewallBackend::NoneDetected {
        return;
    }
    if let Some(zone) = outcome.effective_zone(&iface.name) {
        print::aligned_line("Zone", zone.to_string());
    }

    let ports: Vec<String> = RuleIntent::samba()
        .ports
        .iter()
        .map(|p| {
            let text = p.to_string();
            if outcome.covers(*p, &iface.name) {
                text.color(colors::PORT).to_string()
            } else {
                text.red().strikethrough().to_string()
            }
        })
        .collect();
    print::aligned_line("Ports", ports.join(" "));
}

pub(crate) fn print_report(report: &DiscrepancyReport) {
    Print::header("verification");
    let status = report.status.to_string();
    let status = match report.status {
        DiscrepancyStatus::Consistent => status.green().bold(),
        DiscrepancyStatus::ListeningTooBroad => status.yellow().bold(),
        _ => status.red().bold(),
    };
    print::aligned_line("Status", status);

    for f in &report.details {
        finding!("{}: {}", f.category, f.message);
    }
    if report.status == DiscrepancyStatus::ListeningTooBroad {
        warn!("The share is reachable but also exposed on every other interface");
    }
}
