// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Provisioning Orchestrator
//!
//! Drives one run from interface inventory to a verified binding:
//!
//! ```text
//! share dir -> inventory -> [prompt: interface] -> [prompt: protocol]
//!   -> install -> write config -> SELinux -> start service
//!   -> firewall -> settle -> verify -> RunSummary
//! ```
//!
//! Collaborator failures that do not make the service unusable become
//! [`Notice`]s in the summary. Failures that do (no candidate interface, no
//! way to install, unwritable config) abort with an error.

use std::time::Duration;

use anyhow::Context;

use sambind_common::config::Config;
use sambind_common::error::{Notice, ProvisionError};
use sambind_common::interface::binding_candidates;
use sambind_common::models::binding::{BindingState, DiscrepancyReport, ListeningSocket};
use sambind_common::models::firewall::{FirewallBackend, RuleIntent, RuleOutcome};
use sambind_common::models::interface::NetworkInterface;
use sambind_common::models::protocol::ProtocolVersion;
use sambind_common::models::selection::{SelectionList, SelectionOption};
use sambind_common::system::{
    CommandRunner, ConfigWriter, FirewallProbe, InterfaceSource, PackageInstaller,
    SecurityContext, ServiceAction, ServiceControl, ServiceNames, ShareSpec, SocketProbe,
};
use sambind_common::{debug, error, info, success, warn};

use crate::firewall::{self, Detection};
use crate::prompt::{self, Resolution, TimedPrompt};
use crate::verifier;

/// Package that provides the daemon.
pub const PACKAGE: &str = "samba";

/// Poll cadence while waiting for the daemon to open its primary port.
pub const SETTLE_POLL: Duration = Duration::from_millis(500);

/// Borrowed handles to everything the run needs from the host.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub interfaces: &'a dyn InterfaceSource,
    pub packages: &'a dyn PackageInstaller,
    pub config: &'a dyn ConfigWriter,
    pub services: &'a dyn ServiceControl,
    pub sockets: &'a dyn SocketProbe,
    pub firewall: &'a dyn FirewallProbe,
    pub runner: &'a dyn CommandRunner,
    pub security: &'a dyn SecurityContext,
}

/// Everything a finished run has to say.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub interface: NetworkInterface,
    pub interface_resolution: Resolution,
    pub protocol: ProtocolVersion,
    pub protocol_resolution: Resolution,
    pub share: ShareSpec,
    pub detection: Detection,
    pub firewall: RuleOutcome,
    pub report: DiscrepancyReport,
    pub notices: Vec<Notice>,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.report.is_reachable()
    }

    /// The failure that decides the exit status, if any.
    pub fn failure(&self) -> Option<ProvisionError> {
        (!self.succeeded()).then(|| ProvisionError::ServiceDownAfterConfig {
            port: RuleIntent::samba().primary.port,
        })
    }

    /// UNC path a Windows client would type, e.g. `\\192.168.1.100\shared`.
    pub fn unc_path(&self) -> Option<String> {
        self.interface
            .primary_ipv4()
            .map(|ip| format!("\\\\{ip}\\{}", self.share.name))
    }
}

/// What the operator picked, or what was picked for them.
#[derive(Debug, Clone)]
pub struct Choices {
    pub interface: NetworkInterface,
    pub interface_resolution: Resolution,
    pub protocol: ProtocolVersion,
    pub protocol_resolution: Resolution,
    pub share: ShareSpec,
}

/// Interface options in inventory order. Option 0 is the first candidate.
pub fn interface_options(
    candidates: &[NetworkInterface],
) -> Option<SelectionList<NetworkInterface>> {
    let options = candidates
        .iter()
        .enumerate()
        .map(|(index, iface)| SelectionOption {
            index,
            label: iface.label(),
            hints: vec![format!("{} interface", iface.kind)],
            value: iface.clone(),
        })
        .collect();
    SelectionList::new(options)
}

pub struct Provisioner<'a> {
    host: Collaborators<'a>,
    cfg: &'a Config,
    /// `None` answers every prompt with option 0.
    prompt: Option<TimedPrompt>,
    intent: RuleIntent,
}

impl<'a> Provisioner<'a> {
    pub fn new(host: Collaborators<'a>, cfg: &'a Config, prompt: Option<TimedPrompt>) -> Self {
        Self {
            host,
            cfg,
            prompt,
            intent: RuleIntent::samba(),
        }
    }

    pub fn intent(&self) -> &RuleIntent {
        &self.intent
    }

    fn share(&self) -> ShareSpec {
        ShareSpec {
            path: self.cfg.share_path.clone(),
            name: self.cfg.share_name.clone(),
            verbose_logging: self.cfg.debug,
        }
    }

    async fn choose<T: Clone>(
        &mut self,
        title: &str,
        options: &SelectionList<T>,
    ) -> (T, Resolution) {
        let selection = match self.prompt.as_mut() {
            Some(p) => p.select(title, options).await,
            None => prompt::unattended(options),
        };
        (selection.value, selection.resolution)
    }

    /// Prepares the share, then asks for the interface and protocol range.
    /// Nothing on the host is installed or rewritten yet.
    pub async fn select(&mut self) -> anyhow::Result<Choices> {
        let share = self.share();
        self.host.config.prepare_share(&share)?;

        let inventory = self.host.interfaces.list_interfaces()?;
        let candidates = binding_candidates(&inventory);
        debug!(verbosity = 1, "{} binding candidates", candidates.len());
        let options =
            interface_options(&candidates).ok_or(ProvisionError::NoCandidateInterface)?;

        let (interface, interface_resolution) = self.choose("Network interface", &options).await;
        info!("Binding to {}", interface.label());

        let (protocol, protocol_resolution) =
            self.choose("SMB protocol range", &ProtocolVersion::options()).await;
        info!("Protocol range {protocol}");

        Ok(Choices {
            interface,
            interface_resolution,
            protocol,
            protocol_resolution,
            share,
        })
    }

    pub async fn run(&mut self) -> anyhow::Result<RunSummary> {
        let choices = self.select().await?;
        self.apply(choices).await
    }

    /// Installs, configures and starts the daemon on the chosen interface,
    /// opens the firewall and verifies the result.
    pub async fn apply(&self, choices: Choices) -> anyhow::Result<RunSummary> {
        let Choices {
            interface,
            interface_resolution,
            protocol,
            protocol_resolution,
            share,
        } = choices;
        let mut notices = Vec::new();

        self.host
            .packages
            .install(PACKAGE)
            .with_context(|| format!("failed to install {PACKAGE}"))?;

        self.host
            .config
            .write_config(&interface, protocol, &share)
            .context("failed to write the daemon configuration")?;

        if let Err(e) = self.host.config.validate() {
            warn!("{e}");
            notices.push(Notice::Collaborator(format!("configuration check: {e}")));
        }

        if let Err(e) = self.host.security.apply(&share.path) {
            warn!("SELinux labelling failed: {e}");
            notices.push(Notice::Collaborator(format!("SELinux: {e}")));
        }

        let names = self.host.services.resolve_names();
        notices.extend(self.start_services(&names));

        let detection = firewall::detect(self.host.firewall);
        if detection.selected == FirewallBackend::NoneDetected && self.cfg.require_firewall {
            error!("No firewall backend detected and --require-firewall is set");
            return Err(ProvisionError::FirewallRequired.into());
        }
        let (outcome, fw_notices) =
            firewall::reconcile(&detection, self.host.runner, &self.intent, &interface);
        notices.extend(fw_notices);

        let sockets = match self.settle().await {
            Ok(sockets) => sockets,
            Err(e) => {
                warn!("Could not read listening sockets: {e}");
                notices.push(Notice::Collaborator(format!("socket probe: {e}")));
                Vec::new()
            }
        };

        let state = BindingState {
            declared_interface: interface.clone(),
            declared_ports: self.intent.declared_ports(),
            actual_listening_sockets: sockets,
        };
        let report = verifier::verify(&state, &self.intent, &outcome);

        if report.is_reachable() {
            success!("Verification: {}", report.status);
        } else {
            error!("Verification: {}", report.status);
        }

        Ok(RunSummary {
            interface,
            interface_resolution,
            protocol,
            protocol_resolution,
            share,
            detection,
            firewall: outcome,
            report,
            notices,
        })
    }

    /// Enables and starts each unit, retrying once with a restart.
    fn start_services(&self, names: &ServiceNames) -> Vec<Notice> {
        let mut notices = Vec::new();
        let services = self.host.services;

        for name in names.all() {
            if let Err(e) = services.control(name, ServiceAction::Enable) {
                warn!("{e}");
            }
            let started = services
                .control(name, ServiceAction::Start)
                .or_else(|e| {
                    warn!("{e}, retrying with restart");
                    services.control(name, ServiceAction::Restart)
                });
            match started {
                Ok(()) if services.is_active(name) => success!("{name} is running"),
                Ok(()) => {
                    warn!("{name} started but is not active");
                    notices.push(Notice::Collaborator(format!("{name} is not active")));
                }
                Err(e) => {
                    warn!("{name} could not be started: {e}");
                    notices.push(Notice::Collaborator(format!("{name}: {e}")));
                }
            }
        }
        notices
    }

    /// Polls the socket table until the primary port shows up or the settle
    /// timeout passes. Returns the last snapshot either way.
    async fn settle(&self) -> anyhow::Result<Vec<ListeningSocket>> {
        let primary = self.intent.primary;
        let deadline = tokio::time::Instant::now() + self.cfg.settle_timeout;

        loop {
            let sockets = self.host.sockets.listening_sockets()?;
            let up = sockets
                .iter()
                .any(|s| s.port == primary.port && s.transport == primary.transport);
            if up || tokio::time::Instant::now() + SETTLE_POLL > deadline {
                return Ok(sockets);
            }
            tokio::time::sleep(SETTLE_POLL).await;
        }
    }
}

/// Result of `verify` against an already provisioned host.
#[derive(Debug, Clone)]
pub struct Verification {
    pub interface: NetworkInterface,
    pub detection: Detection,
    pub firewall: RuleOutcome,
    pub report: DiscrepancyReport,
}

/// Re-checks a running setup without changing anything.
pub fn verify_existing(
    host: Collaborators<'_>,
    interface: &str,
) -> anyhow::Result<Verification> {
    let intent = RuleIntent::samba();

    let inventory = host.interfaces.list_interfaces()?;
    let iface = inventory
        .into_iter()
        .find(|i| i.name == interface)
        .with_context(|| format!("no interface named {interface}"))?;

    let detection = firewall::detect(host.firewall);
    let outcome = firewall::observe(&detection, host.runner, &intent, &iface)
        .with_context(|| format!("failed to read {} rules", detection.selected))?;

    let sockets = host.sockets.listening_sockets()?;
    let state = BindingState {
        declared_interface: iface.clone(),
        declared_ports: intent.declared_ports(),
        actual_listening_sockets: sockets,
    };
    let report = verifier::verify(&state, &intent, &outcome);

    Ok(Verification {
        interface: iface,
        detection,
        firewall: outcome,
        report,
    })
}
