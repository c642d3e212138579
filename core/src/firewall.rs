// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Firewall Reconciliation
//!
//! Detects which firewall governs the host and translates a backend-neutral
//! [`RuleIntent`] into that backend's commands.
//!
//! Detection walks [`FirewallBackend::PRIORITY`] and picks the first backend
//! whose command exists *and* whose service is active. Only the selected
//! backend is ever touched; any other active backend is reported back so the
//! caller can surface the residual risk.
//!
//! Every backend can also *observe* the rules currently in place, which is what
//! `sambind verify` feeds into the verifier for an already provisioned host.

mod firewalld;
mod iptables;
mod ufw;

pub use firewalld::Firewalld;
pub use iptables::Iptables;
pub use ufw::Ufw;

use sambind_common::error::Notice;
use sambind_common::models::firewall::{FirewallBackend, RuleIntent, RuleOutcome};
use sambind_common::models::interface::NetworkInterface;
use sambind_common::system::{CommandRunner, FirewallProbe};
use sambind_common::{debug, info, warn};

/// Result of backend detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub selected: FirewallBackend,
    /// Active backends that lost to `selected` on priority.
    pub also_active: Vec<FirewallBackend>,
}

impl Detection {
    pub fn none() -> Self {
        Self {
            selected: FirewallBackend::NoneDetected,
            also_active: Vec::new(),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        !self.also_active.is_empty()
    }

    pub fn notice(&self) -> Option<Notice> {
        if self.selected == FirewallBackend::NoneDetected {
            Some(Notice::NoFirewallBackendDetected)
        } else if self.is_ambiguous() {
            Some(Notice::BackendDetectionAmbiguous {
                selected: self.selected,
                ignored: self.also_active.clone(),
            })
        } else {
            None
        }
    }
}

/// Returns the highest-priority backend that is both installed and running.
pub fn detect(probe: &dyn FirewallProbe) -> Detection {
    let active: Vec<FirewallBackend> = FirewallBackend::PRIORITY
        .into_iter()
        .filter(|b| probe.command_available(*b) && probe.service_active(*b))
        .collect();

    debug!(verbosity = 1, "Active firewall backends: {active:?}");

    match active.split_first() {
        Some((selected, rest)) => Detection {
            selected: *selected,
            also_active: rest.to_vec(),
        },
        None => Detection::none(),
    }
}

/// One firewall backend.
///
/// Implementations run commands through the shared [`CommandRunner`] and never
/// panic or abort on a failed command; every failure ends up in the returned
/// [`RuleOutcome`].
pub trait FirewallHandler {
    fn backend(&self) -> FirewallBackend;

    /// Opens every port of `intent` for traffic arriving on `iface`.
    fn apply(&self, intent: &RuleIntent, iface: &NetworkInterface) -> RuleOutcome;

    /// Reads the rules currently in place that concern `intent`.
    fn observe(&self, intent: &RuleIntent, iface: &NetworkInterface) -> anyhow::Result<RuleOutcome>;
}

/// Handler for `backend`, or `None` when there is nothing to drive.
pub fn handler<'a>(
    backend: FirewallBackend,
    runner: &'a dyn CommandRunner,
) -> Option<Box<dyn FirewallHandler + 'a>> {
    match backend {
        FirewallBackend::Firewalld => Some(Box::new(Firewalld::new(runner))),
        FirewallBackend::Ufw => Some(Box::new(Ufw::new(runner))),
        FirewallBackend::Iptables => Some(Box::new(Iptables::new(runner))),
        FirewallBackend::NoneDetected => None,
    }
}

/// Applies `intent` with the detected backend and collects the notices worth
/// putting in a run summary.
pub fn reconcile(
    detection: &Detection,
    runner: &dyn CommandRunner,
    intent: &RuleIntent,
    iface: &NetworkInterface,
) -> (RuleOutcome, Vec<Notice>) {
    let mut notices: Vec<Notice> = detection.notice().into_iter().collect();

    let Some(handler) = handler(detection.selected, runner) else {
        warn!("No active firewall detected, ports are assumed to be reachable");
        return (RuleOutcome::skipped(), notices);
    };

    info!("Configuring {} for {}", handler.backend(), iface.name);
    if detection.is_ambiguous() {
        for other in &detection.also_active {
            warn!("{other} is active too and may still block SMB traffic");
        }
    }

    let outcome = handler.apply(intent, iface);

    if !outcome.errors.is_empty() {
        for e in &outcome.errors {
            warn!("{e}");
        }
        notices.push(Notice::RuleApplicationPartialFailure {
            backend: outcome.backend,
            failed: outcome.errors.len(),
            total: outcome.attempted,
        });
    }
    for w in &outcome.warnings {
        warn!("{w}");
        notices.push(Notice::Collaborator(w.clone()));
    }

    (outcome, notices)
}

/// Reads the live rules of the detected backend. A host without a firewall
/// yields a skipped outcome, which the verifier treats as fully open.
pub fn observe(
    detection: &Detection,
    runner: &dyn CommandRunner,
    intent: &RuleIntent,
    iface: &NetworkInterface,
) -> anyhow::Result<RuleOutcome> {
    match handler(detection.selected, runner) {
        Some(handler) => handler.observe(intent, iface),
        None => Ok(RuleOutcome::skipped()),
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


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;
    use sambind_common::models::firewall::PortSpec;
    use sambind_common::models::interface::InterfaceKind;
    use sambind_common::system::CommandOutput;

    use super::testing::FakeRunner;
    use super::*;

    struct StaticProbe {
        installed: HashSet<FirewallBackend>,
        active: HashSet<FirewallBackend>,
    }

    impl StaticProbe {
        fn new(installed: &[FirewallBackend], active: &[FirewallBackend]) -> Self {
            Self {
                installed: installed.iter().copied().collect(),
                active: active.iter().copied().collect(),
            }
        }
    }

    impl FirewallProbe for StaticProbe {
        fn command_available(&self, backend: FirewallBackend) -> bool {
            self.installed.contains(&backend)
        }

        fn service_active(&self, backend: FirewallBackend) -> bool {
            self.active.contains(&backend)
        }
    }

    fn eth0() -> NetworkInterface {
        NetworkInterface::new(
            "eth0",
            vec!["192.168.1.100/24".parse().unwrap()],
            true,
            InterfaceKind::Physical,
        )
    }

    #[test]
    fn firewalld_wins_over_ufw_when_both_active() {
        use FirewallBackend::*;
        let probe = StaticProbe::new(&[Firewalld, Ufw], &[Firewalld, Ufw]);
        let d = detect(&probe);
        assert_eq!(d.selected, Firewalld);
        assert_eq!(d.also_active, vec![Ufw]);
        assert!(matches!(
            d.notice(),
            Some(Notice::BackendDetectionAmbiguous { .. })
        ));
    }

    #[test]
    fn installed_but_stopped_backend_is_skipped() {
        use FirewallBackend::*;
        let probe = StaticProbe::new(&[Firewalld, Iptables], &[Iptables]);
        assert_eq!(detect(&probe).selected, Iptables);
    }

    #[test]
    fn active_service_without_command_is_skipped() {
        use FirewallBackend::*;
        let probe = StaticProbe::new(&[], &[Ufw]);
        let d = detect(&probe);
        assert_eq!(d.selected, NoneDetected);
        assert_eq!(d.notice(), Some(Notice::NoFirewallBackendDetected));
    }

    #[test]
    fn reconcile_without_backend_touches_nothing() {
        let runner = FakeRunner::default();
        let (outcome, notices) =
            reconcile(&Detection::none(), &runner, &RuleIntent::samba(), &eth0());

        assert_eq!(outcome.backend, FirewallBackend::NoneDetected);
        assert!(!outcome.applied);
        assert!(runner.calls().is_empty());
        assert_eq!(notices, vec![Notice::NoFirewallBackendDetected]);
    }

    #[test]
    fn reconcile_reports_partial_failure() {
        let runner = FakeRunner::default()
            .answer("ufw allow 139/tcp", CommandOutput::failed(1, "ERROR: boom"));
        let detection = Detection {
            selected: FirewallBackend::Ufw,
            also_active: vec![],
        };

        let (outcome, notices) = reconcile(&detection, &runner, &RuleIntent::samba(), &eth0());

        assert!(outcome.is_partial());
        assert!(!outcome.covers(PortSpec::tcp(139), "eth0"));
        assert!(outcome.covers(PortSpec::tcp(445), "eth0"));
        assert_eq!(
            notices,
            vec![Notice::RuleApplicationPartialFailure {
                backend: FirewallBackend::Ufw,
                failed: 1,
                total: 4,
            }]
        );
    }

    #[test]
    fn only_selected_backend_is_driven() {
        let runner = FakeRunner::default();
        let detection = Detection {
            selected: FirewallBackend::Ufw,
            also_active: vec![FirewallBackend::Iptables],
        };
        reconcile(&detection, &runner, &RuleIntent::samba(), &eth0());
        assert!(runner.calls().iter().all(|c| c.starts_with("ufw ")));
    }

    fn backend_strategy() -> impl Strategy<Value = Vec<FirewallBackend>> {
        proptest::sample::subsequence(FirewallBackend::PRIORITY.to_vec(), 0..=3)
    }

    proptest! {
        #[test]
        fn detection_is_first_active_in_priority_order(
            installed in backend_strategy(),
            active in backend_strategy(),
        ) {
            let probe = StaticProbe::new(&installed, &active);
            let first = detect(&probe);
            let second = detect(&probe);
            prop_assert_eq!(&first, &second);

            let expected = FirewallBackend::PRIORITY
                .into_iter()
                .find(|b| installed.contains(b) && active.contains(b))
                .unwrap_or(FirewallBackend::NoneDetected);
            prop_assert_eq!(first.selected, expected);
            prop_assert!(!first.also_active.contains(&first.selected));
        }
    }
}
