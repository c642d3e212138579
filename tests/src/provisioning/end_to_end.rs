// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

#![cfg(test)]
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use sambind_common::config::Config;
use sambind_common::error::{DiscoveryError, Notice, ProvisionError};
use sambind_common::models::binding::DiscrepancyStatus;
use sambind_common::models::firewall::FirewallBackend;
use sambind_common::models::interface::InterfaceKind;
use sambind_common::models::protocol::ProtocolVersion;
use sambind_common::system::{CommandOutput, ServiceAction};
use sambind_common::utils::input::ScriptedInput;
use sambind_core::prompt::{Resolution, TimedPrompt};
use sambind_core::provision::Provisioner;

use crate::utils::{FakeHost, QuietDisplay, eth0, iface, lo, smbd, virbr0};

fn unattended() -> Config {
    Config {
        unattended: true,
        ..Config::default()
    }
}

fn prompt(input: ScriptedInput, secs: u64) -> (TimedPrompt, Arc<QuietDisplay>) {
    let display = Arc::new(QuietDisplay::default());
    let prompt = TimedPrompt::new(Box::new(input), display.clone(), Duration::from_secs(secs));
    (prompt, display)
}

fn provision_error(err: &anyhow::Error) -> Option<&ProvisionError> {
    err.downcast_ref::<ProvisionError>()
}

#[tokio::test(start_paused = true)]
async fn wildcard_listener_is_reachable_but_too_broad() {
    let host = FakeHost::new(vec![lo(), eth0()]).listening(vec![
        smbd("0.0.0.0", 445),
        smbd("0.0.0.0", 139),
    ]);
    let cfg = unattended();

    let summary = Provisioner::new(host.collaborators(), &cfg, None)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.interface.name, "eth0");
    assert_eq!(summary.interface_resolution, Resolution::Unattended);
    assert_eq!(summary.protocol, ProtocolVersion::MinCompat);
    assert_eq!(summary.report.status, DiscrepancyStatus::ListeningTooBroad);
    assert!(summary.succeeded());
    assert!(summary.failure().is_none());
    assert_eq!(summary.unc_path().as_deref(), Some("\\\\192.168.1.100\\shared"));

    let written = host.written().unwrap();
    assert_eq!(written.interface, "eth0");
    assert_eq!(written.share.name, "shared");
    assert_eq!(host.installs(), vec!["samba"]);
}

#[tokio::test(start_paused = true)]
async fn missing_primary_listener_is_service_down_after_settling() {
    let host = FakeHost::new(vec![eth0()])
        .with_backend(FirewallBackend::Ufw, true)
        .listening(vec![]);
    let cfg = unattended();

    let start = Instant::now();
    let summary = Provisioner::new(host.collaborators(), &cfg, None)
        .run()
        .await
        .unwrap();
    let waited = start.elapsed();

    assert_eq!(summary.report.status, DiscrepancyStatus::ServiceDown);
    assert!(!summary.succeeded());
    assert!(matches!(
        summary.failure(),
        Some(ProvisionError::ServiceDownAfterConfig { port: 445 })
    ));
    assert!(waited >= Duration::from_secs(9), "gave up after {waited:?}");
    assert!(waited <= cfg.settle_timeout, "overran settle: {waited:?}");
}

#[tokio::test(start_paused = true)]
async fn host_without_firewall_skips_rules_and_is_consistent() {
    let host = FakeHost::new(vec![lo(), eth0()]).listening(vec![smbd("192.168.1.100", 445)]);
    let cfg = unattended();

    let summary = Provisioner::new(host.collaborators(), &cfg, None)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.detection.selected, FirewallBackend::NoneDetected);
    assert_eq!(summary.firewall.backend, FirewallBackend::NoneDetected);
    assert_eq!(summary.report.status, DiscrepancyStatus::Consistent);
    assert!(summary.notices.contains(&Notice::NoFirewallBackendDetected));
    assert!(host.calls().is_empty(), "ran {:?}", host.calls());
}

#[tokio::test(start_paused = true)]
async fn operator_choice_is_taken_immediately() {
    let host = FakeHost::new(vec![
        eth0(),
        iface("wlan0", "10.0.0.12/24", InterfaceKind::Physical),
        virbr0(),
        iface("enp3s0", "172.16.0.4/16", InterfaceKind::Physical),
    ])
    .with_backend(FirewallBackend::Firewalld, true)
    .answer("firewall-cmd --get-default-zone", CommandOutput::ok("public\n"))
    .answer(
        "firewall-cmd --get-zone-of-interface=virbr0",
        CommandOutput::ok("libvirt\n"),
    )
    .listening(vec![smbd("192.168.122.1", 445), smbd("192.168.122.1", 139)]);
    let cfg = Config::default();
    let (prompt, display) = prompt(ScriptedInput::lines(&[(3, "2"), (2, "1")]), 60);

    let start = Instant::now();
    let summary = Provisioner::new(host.collaborators(), &cfg, Some(prompt))
        .run()
        .await
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(summary.interface.name, "virbr0");
    assert_eq!(summary.interface_resolution, Resolution::Chosen);
    assert_eq!(summary.protocol, ProtocolVersion::Balanced);
    assert_eq!(summary.protocol_resolution, Resolution::Chosen);
    assert!(display.rejections().is_empty());

    let firewalld = host.calls_to("firewall-cmd");
    assert!(firewalld.contains(&"firewall-cmd --zone=libvirt --add-service=samba --permanent".to_string()));
    assert!(firewalld.contains(&"firewall-cmd --zone=libvirt --add-port=445/tcp".to_string()));
    assert_eq!(firewalld.last().map(String::as_str), Some("firewall-cmd --reload"));
    assert_eq!(summary.report.status, DiscrepancyStatus::Consistent);
}

#[tokio::test(start_paused = true)]
async fn silent_operator_gets_defaults_after_each_timeout() {
    let host = FakeHost::new(vec![eth0(), virbr0()]).listening(vec![smbd("192.168.1.100", 445)]);
    let cfg = Config::default();
    let (prompt, _display) = prompt(ScriptedInput::silent(), 60);

    let start = Instant::now();
    let summary = Provisioner::new(host.collaborators(), &cfg, Some(prompt))
        .run()
        .await
        .unwrap();

    let waited = start.elapsed();
    assert!(waited >= Duration::from_secs(120), "returned early: {waited:?}");
    assert!(waited < Duration::from_secs(121), "overran: {waited:?}");
    assert_eq!(summary.interface.name, "eth0");
    assert_eq!(summary.interface_resolution, Resolution::TimedOut);
    assert_eq!(summary.protocol, ProtocolVersion::MinCompat);
    assert_eq!(summary.protocol_resolution, Resolution::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn invalid_answers_are_asked_again() {
    let host = FakeHost::new(vec![eth0(), virbr0()]).listening(vec![smbd("192.168.122.1", 445)]);
    let cfg = Config::default();
    let (prompt, display) = prompt(
        ScriptedInput::lines(&[(1, "seven"), (1, "9"), (1, "1")]),
        5,
    );

    let summary = Provisioner::new(host.collaborators(), &cfg, Some(prompt))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.interface.name, "virbr0");
    assert_eq!(summary.interface_resolution, Resolution::Chosen);
    assert_eq!(display.rejections().len(), 2);
    // the script is used up, so the protocol prompt runs out its clock
    assert_eq!(summary.protocol_resolution, Resolution::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn required_firewall_aborts_after_services_start() {
    let host = FakeHost::new(vec![eth0()]).listening(vec![smbd("192.168.1.100", 445)]);
    let cfg = Config {
        require_firewall: true,
        ..unattended()
    };

    let err = Provisioner::new(host.collaborators(), &cfg, None)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        provision_error(&err),
        Some(ProvisionError::FirewallRequired)
    ));
    assert!(
        host.service_actions()
            .contains(&("smbd".to_string(), ServiceAction::Start))
    );
}

#[tokio::test(start_paused = true)]
async fn partial_rule_failure_is_reported_and_run_continues() {
    let host = FakeHost::new(vec![eth0()])
        .with_backend(FirewallBackend::Ufw, true)
        .answer(
            "ufw allow 138/udp",
            CommandOutput::failed(1, "ERROR: Could not update running firewall"),
        )
        .listening(vec![smbd("192.168.1.100", 445)]);
    let cfg = unattended();

    let summary = Provisioner::new(host.collaborators(), &cfg, None)
        .run()
        .await
        .unwrap();

    assert!(summary.notices.contains(&Notice::RuleApplicationPartialFailure {
        backend: FirewallBackend::Ufw,
        failed: 1,
        total: 4,
    }));
    assert_eq!(summary.report.status, DiscrepancyStatus::FirewallRuleMissing);
    assert_eq!(summary.report.details.len(), 1);
    assert!(summary.report.details[0].message.contains("138/udp"));
}

#[tokio::test(start_paused = true)]
async fn only_the_winning_backend_is_configured() {
    let host = FakeHost::new(vec![eth0()])
        .with_backend(FirewallBackend::Ufw, true)
        .with_backend(FirewallBackend::Iptables, true)
        .listening(vec![smbd("192.168.1.100", 445)]);
    let cfg = unattended();

    let summary = Provisioner::new(host.collaborators(), &cfg, None)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.detection.selected, FirewallBackend::Ufw);
    assert!(summary.notices.contains(&Notice::BackendDetectionAmbiguous {
        selected: FirewallBackend::Ufw,
        ignored: vec![FirewallBackend::Iptables],
    }));
    assert_eq!(host.calls_to("ufw").len(), 4);
    assert!(host.calls_to("iptables").is_empty());
    assert_eq!(summary.report.status, DiscrepancyStatus::Consistent);
}

#[tokio::test(start_paused = true)]
async fn loopback_only_host_has_nothing_to_bind() {
    let host = FakeHost::new(vec![lo()]);
    let cfg = unattended();

    let err = Provisioner::new(host.collaborators(), &cfg, None)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        provision_error(&err),
        Some(ProvisionError::NoCandidateInterface)
    ));
    assert!(host.installs().is_empty());
    assert!(host.written().is_none());
}

#[tokio::test(start_paused = true)]
async fn interface_discovery_failure_is_fatal() {
    let host = FakeHost::new(vec![]).discovery_fails("netlink socket refused");
    let cfg = unattended();

    let err = Provisioner::new(host.collaborators(), &cfg, None)
        .run()
        .await
        .unwrap_err();

    assert!(err.downcast_ref::<DiscoveryError>().is_some());
    assert!(err.to_string().contains("netlink socket refused"));
}

#[tokio::test(start_paused = true)]
async fn unknown_distribution_stops_before_config_is_written() {
    let host = FakeHost::new(vec![eth0()]).without_package_manager();
    let cfg = unattended();

    let err = Provisioner::new(host.collaborators(), &cfg, None)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        provision_error(&err),
        Some(ProvisionError::NoPackageManager { .. })
    ));
    assert!(host.written().is_none());
}

#[tokio::test(start_paused = true)]
async fn failed_unit_is_retried_with_restart_and_noted() {
    let host = FakeHost::new(vec![eth0()])
        .failing_unit("nmbd")
        .listening(vec![smbd("192.168.1.100", 445)]);
    let cfg = unattended();

    let summary = Provisioner::new(host.collaborators(), &cfg, None)
        .run()
        .await
        .unwrap();

    let actions = host.service_actions();
    assert!(actions.contains(&("nmbd".to_string(), ServiceAction::Restart)));
    assert!(!actions.contains(&("smbd".to_string(), ServiceAction::Restart)));
    assert!(summary.notices.iter().any(|n| matches!(
        n,
        Notice::Collaborator(msg) if msg.contains("nmbd")
    )));
    assert!(summary.succeeded());
}

#[tokio::test(start_paused = true)]
async fn verification_waits_for_late_listener() {
    let host = FakeHost::new(vec![eth0()])
        .listening(vec![])
        .listening(vec![])
        .listening(vec![smbd("192.168.1.100", 445)]);
    let cfg = unattended();

    let start = Instant::now();
    let summary = Provisioner::new(host.collaborators(), &cfg, None)
        .run()
        .await
        .unwrap();

    let waited = start.elapsed();
    assert!(waited >= Duration::from_secs(1) && waited < Duration::from_secs(2));
    assert_eq!(summary.report.status, DiscrepancyStatus::Consistent);
}

#[tokio::test(start_paused = true)]
async fn debug_run_asks_for_verbose_daemon_logging() {
    let host = FakeHost::new(vec![eth0()]).listening(vec![smbd("192.168.1.100", 445)]);
    let cfg = Config {
        debug: true,
        share_name: "drop".to_string(),
        ..unattended()
    };

    let summary = Provisioner::new(host.collaborators(), &cfg, None)
        .run()
        .await
        .unwrap();

    let written = host.written().unwrap();
    assert!(written.share.verbose_logging);
    assert_eq!(written.share.name, "drop");
    assert_eq!(summary.unc_path().as_deref(), Some("\\\\192.168.1.100\\drop"));
}
