// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

#![cfg(test)]
use std::path::PathBuf;

use sambind_common::models::binding::DiscrepancyStatus;
use sambind_common::models::firewall::{FirewallBackend, PortSpec};
use sambind_common::system::CommandOutput;
use sambind_core::diagnostics::collect_sections;
use sambind_core::info::InfoService;
use sambind_core::provision::verify_existing;

use crate::utils::{FakeHost, eth0, lo, smbd, virbr0};

fn firewalld_host() -> FakeHost {
    FakeHost::new(vec![lo(), eth0(), virbr0()])
        .with_backend(FirewallBackend::Firewalld, true)
        .answer("firewall-cmd --get-default-zone", CommandOutput::ok("public\n"))
        .answer(
            "firewall-cmd --get-active-zones",
            CommandOutput::ok("libvirt\n  interfaces: virbr0\npublic\n  interfaces: eth0\n"),
        )
}

#[test]
fn bridge_in_libvirt_zone_misses_rules_granted_only_in_public() {
    let host = firewalld_host()
        .answer(
            "firewall-cmd --zone=public --list-services",
            CommandOutput::ok("ssh samba dhcpv6-client\n"),
        )
        .listening(vec![smbd("192.168.122.1", 445)]);

    let result = verify_existing(host.collaborators(), "virbr0").unwrap();

    assert_eq!(result.detection.selected, FirewallBackend::Firewalld);
    assert_eq!(result.firewall.effective_zone("virbr0"), Some("libvirt"));
    assert_eq!(result.report.status, DiscrepancyStatus::FirewallRuleMissing);
    assert!(
        result
            .report
            .details
            .iter()
            .any(|f| f.message.contains("445/tcp") && f.message.contains("zone libvirt"))
    );
}

#[test]
fn same_rules_are_fine_for_interface_in_public() {
    let host = firewalld_host()
        .answer(
            "firewall-cmd --zone=public --list-services",
            CommandOutput::ok("ssh samba dhcpv6-client\n"),
        )
        .listening(vec![smbd("192.168.1.100", 445)]);

    let result = verify_existing(host.collaborators(), "eth0").unwrap();

    assert!(result.firewall.covers(PortSpec::tcp(445), "eth0"));
    assert_eq!(result.report.status, DiscrepancyStatus::Consistent);
}

#[test]
fn verification_never_changes_rules() {
    let host = firewalld_host().listening(vec![smbd("192.168.1.100", 445)]);

    verify_existing(host.collaborators(), "eth0").unwrap();

    assert!(
        host.calls()
            .iter()
            .all(|c| !c.contains("--add-") && !c.contains("--reload")),
        "mutating call in {:?}",
        host.calls()
    );
}

#[test]
fn down_service_outranks_firewall_findings() {
    let host = firewalld_host().listening(vec![]);

    let result = verify_existing(host.collaborators(), "virbr0").unwrap();

    assert_eq!(result.report.status, DiscrepancyStatus::ServiceDown);
    assert!(!result.report.is_reachable());
}

#[test]
fn unknown_interface_is_an_error() {
    let host = FakeHost::new(vec![lo(), eth0()]);

    let err = verify_existing(host.collaborators(), "wlan9").unwrap_err();

    assert!(err.to_string().contains("wlan9"));
}

#[test]
fn accept_policy_counts_as_open() {
    let host = FakeHost::new(vec![eth0()])
        .with_backend(FirewallBackend::Iptables, true)
        .answer("iptables -S INPUT", CommandOutput::ok("-P INPUT ACCEPT\n"))
        .listening(vec![smbd("192.168.1.100", 445)]);

    let result = verify_existing(host.collaborators(), "eth0").unwrap();

    assert_eq!(result.firewall.backend, FirewallBackend::Iptables);
    assert_eq!(result.report.status, DiscrepancyStatus::Consistent);
}

#[test]
fn overview_lists_candidates_and_smb_listeners_only() {
    let host = FakeHost::new(vec![lo(), eth0(), virbr0()])
        .with_backend(FirewallBackend::Ufw, true)
        .listening(vec![
            smbd("0.0.0.0", 445),
            smbd("127.0.0.1", 631),
            smbd("192.168.1.100", 139),
        ]);

    let overview = InfoService::new(host.collaborators()).overview().unwrap();

    let names: Vec<&str> = overview.candidates().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["eth0", "virbr0"]);
    assert_eq!(overview.interfaces.len(), 3);
    assert_eq!(overview.firewall.selected, FirewallBackend::Ufw);
    let ports: Vec<u16> = overview.listeners.iter().map(|s| s.port).collect();
    assert_eq!(ports, vec![445, 139]);
}

#[test]
fn report_sections_cover_the_whole_host() {
    let host = FakeHost::new(vec![lo(), eth0()])
        .with_backend(FirewallBackend::Ufw, true)
        .answer("uname -a", CommandOutput::ok("Linux nas 6.8.0 x86_64\n"))
        .answer(
            "ufw status",
            CommandOutput::ok("Status: active\n445/tcp                    ALLOW       Anywhere\n"),
        )
        .listening(vec![smbd("192.168.1.100", 445), smbd("127.0.0.1", 631)]);

    let sections = collect_sections(&host.collaborators(), &[PathBuf::from("/nonexistent/log.smbd")]);

    let titles: Vec<&str> = sections.iter().map(|s| s.title).collect();
    assert_eq!(
        titles,
        vec!["SYSTEM", "CONFIGURATION", "SERVICES", "NETWORK", "PORTS", "FIREWALL", "RECENT LOGS"]
    );
    assert!(sections[0].body.contains("Linux nas"));
    assert!(sections[2].body.contains("smbd status:"));
    assert!(sections[2].body.contains("nmbd status:"));
    assert!(sections[4].body.contains("192.168.1.100:445"));
    assert!(!sections[4].body.contains("631"));
    assert!(sections[5].body.contains("backend: ufw"));
    assert!(sections[5].body.contains("eth0: open 445/tcp"));
    assert!(sections[6].body.is_empty());
}
