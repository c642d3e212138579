// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! A fabricated host. Every collaborator answers from fixed data and records
//! what the engine asked of it, so whole runs can be driven without root,
//! without a package manager and without touching a real firewall.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Mutex;

use sambind_common::error::{DiscoveryError, InvalidSelectionInput, ProvisionError};
use sambind_common::models::binding::ListeningSocket;
use sambind_common::models::firewall::{FirewallBackend, Transport};
use sambind_common::models::interface::{InterfaceKind, NetworkInterface};
use sambind_common::models::protocol::ProtocolVersion;
use sambind_common::system::{
    CommandOutput, CommandRunner, ConfigWriter, FirewallProbe, InterfaceSource, PackageInstaller,
    SecurityContext, ServiceAction, ServiceControl, ServiceNames, ShareSpec, SocketProbe,
};
use sambind_core::prompt::{OptionView, PromptDisplay, Resolution};
use sambind_core::provision::Collaborators;

pub fn iface(name: &str, cidr: &str, kind: InterfaceKind) -> NetworkInterface {
    let addresses = match cidr.parse() {
        Ok(net) => vec![net],
        Err(_) => Vec::new(),
    };
    NetworkInterface::new(name, addresses, true, kind)
}

pub fn lo() -> NetworkInterface {
    iface("lo", "127.0.0.1/8", InterfaceKind::Loopback)
}

pub fn eth0() -> NetworkInterface {
    iface("eth0", "192.168.1.100/24", InterfaceKind::Physical)
}

pub fn virbr0() -> NetworkInterface {
    iface("virbr0", "192.168.122.1/24", InterfaceKind::Bridge)
}

pub fn smbd(addr: &str, port: u16) -> ListeningSocket {
    let ip: IpAddr = addr.parse().unwrap_or(IpAddr::from([0, 0, 0, 0]));
    ListeningSocket::new(ip, port, Transport::Tcp).with_process(812, "smbd")
}

/// The written configuration as the engine asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenConfig {
    pub interface: String,
    pub protocol: ProtocolVersion,
    pub share: ShareSpec,
}

#[derive(Default)]
pub struct FakeHost {
    inventory: Vec<NetworkInterface>,
    discovery_failure: Option<String>,
    no_package_manager: bool,
    available: Vec<FirewallBackend>,
    active: Vec<FirewallBackend>,
    failing_units: Vec<String>,
    answers: HashMap<String, CommandOutput>,
    /// Successive socket table snapshots. The last one repeats forever.
    snapshots: Mutex<VecDeque<Vec<ListeningSocket>>>,
    calls: Mutex<Vec<String>>,
    written: Mutex<Option<WrittenConfig>>,
    service_actions: Mutex<Vec<(String, ServiceAction)>>,
    installs: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new(inventory: Vec<NetworkInterface>) -> Self {
        Self {
            inventory,
            ..Self::default()
        }
    }

    pub fn discovery_fails(mut self, reason: &str) -> Self {
        self.discovery_failure = Some(reason.to_string());
        self
    }

    pub fn without_package_manager(mut self) -> Self {
        self.no_package_manager = true;
        self
    }

    /// Installs a backend, optionally running.
    pub fn with_backend(mut self, backend: FirewallBackend, active: bool) -> Self {
        self.available.push(backend);
        if active {
            self.active.push(backend);
        }
        self
    }

    pub fn failing_unit(mut self, name: &str) -> Self {
        self.failing_units.push(name.to_string());
        self
    }

    /// Scripted answer for a full command line, e.g. `ufw allow 445/tcp`.
    pub fn answer(mut self, cmdline: &str, out: CommandOutput) -> Self {
        self.answers.insert(cmdline.to_string(), out);
        self
    }

    pub fn listening(mut self, sockets: Vec<ListeningSocket>) -> Self {
        if let Ok(snaps) = self.snapshots.get_mut() {
            snaps.push_back(sockets);
        }
        self
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            interfaces: self,
            packages: self,
            config: self,
            services: self,
            sockets: self,
            firewall: self,
            runner: self,
            security: self,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn calls_to(&self, program: &str) -> Vec<String> {
        let prefix = format!("{program} ");
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(&prefix) || c == program)
            .collect()
    }

    pub fn written(&self) -> Option<WrittenConfig> {
        self.written.lock().ok().and_then(|w| w.clone())
    }

    pub fn service_actions(&self) -> Vec<(String, ServiceAction)> {
        self.service_actions
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    pub fn installs(&self) -> Vec<String> {
        self.installs.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

impl InterfaceSource for FakeHost {
    fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, DiscoveryError> {
        match &self.discovery_failure {
            Some(reason) => Err(DiscoveryError {
                reason: reason.clone(),
            }),
            None => Ok(self.inventory.clone()),
        }
    }
}

impl PackageInstaller for FakeHost {
    fn install(&self, package: &str) -> anyhow::Result<()> {
        if self.no_package_manager {
            return Err(ProvisionError::NoPackageManager {
                package: package.to_string(),
            }
            .into());
        }
        if let Ok(mut installs) = self.installs.lock() {
            installs.push(package.to_string());
        }
        Ok(())
    }
}

impl ConfigWriter for FakeHost {
    fn prepare_share(&self, _share: &ShareSpec) -> anyhow::Result<()> {
        Ok(())
    }

    fn write_config(
        &self,
        iface: &NetworkInterface,
        protocol: ProtocolVersion,
        share: &ShareSpec,
    ) -> anyhow::Result<()> {
        if let Ok(mut written) = self.written.lock() {
            *written = Some(WrittenConfig {
                interface: iface.name.clone(),
                protocol,
                share: share.clone(),
            });
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl ServiceControl for FakeHost {
    fn resolve_names(&self) -> ServiceNames {
        ServiceNames {
            main: "smbd".to_string(),
            netbios: Some("nmbd".to_string()),
        }
    }

    fn control(&self, name: &str, action: ServiceAction) -> anyhow::Result<()> {
        if let Ok(mut actions) = self.service_actions.lock() {
            actions.push((name.to_string(), action));
        }
        if self.failing_units.iter().any(|u| u == name) && action != ServiceAction::Enable {
            anyhow::bail!("Job for {name}.service failed");
        }
        Ok(())
    }

    fn is_active(&self, name: &str) -> bool {
        !self.failing_units.iter().any(|u| u == name)
    }
}

impl SocketProbe for FakeHost {
    fn listening_sockets(&self) -> anyhow::Result<Vec<ListeningSocket>> {
        let mut snaps = self
            .snapshots
            .lock()
            .map_err(|_| anyhow::anyhow!("socket table poisoned"))?;
        if snaps.len() > 1 {
            return Ok(snaps.pop_front().unwrap_or_default());
        }
        Ok(snaps.front().cloned().unwrap_or_default())
    }
}

impl FirewallProbe for FakeHost {
    fn command_available(&self, backend: FirewallBackend) -> bool {
        self.available.contains(&backend)
    }

    fn service_active(&self, backend: FirewallBackend) -> bool {
        self.active.contains(&backend)
    }
}

impl CommandRunner for FakeHost {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<CommandOutput> {
        let cmdline = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(cmdline.clone());
        }
        Ok(self
            .answers
            .get(&cmdline)
            .cloned()
            .unwrap_or_else(|| CommandOutput::ok("")))
    }

    fn exists(&self, program: &str) -> bool {
        self.available
            .iter()
            .any(|b| b.command() == Some(program))
    }
}

impl SecurityContext for FakeHost {
    fn apply(&self, _path: &Path) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A display nobody looks at. Keeps the number of rejected lines.
#[derive(Default)]
pub struct QuietDisplay {
    rejected: Mutex<Vec<InvalidSelectionInput>>,
}

impl QuietDisplay {
    pub fn rejections(&self) -> Vec<InvalidSelectionInput> {
        self.rejected.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl PromptDisplay for QuietDisplay {
    fn present(&self, _title: &str, _options: &[OptionView]) {}

    fn tick(&self, _remaining_secs: u64, _max_index: usize) {}

    fn rejected(&self, error: &InvalidSelectionInput) {
        if let Ok(mut r) = self.rejected.lock() {
            r.push(error.clone());
        }
    }

    fn resolved(&self, _label: &str, _resolution: Resolution) {}
}
