// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Host Collaborators
//!
//! Contracts for everything the engine needs from the host but does not own:
//! the package manager, the daemon configuration file, the service manager,
//! the socket table, the firewall tooling and SELinux.
//!
//! The engine only ever talks to these traits. Real implementations live in
//! `sambind-core::system`; tests substitute fabricated hosts.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::DiscoveryError;
use crate::models::binding::ListeningSocket;
use crate::models::firewall::FirewallBackend;
use crate::models::interface::NetworkInterface;
use crate::models::protocol::ProtocolVersion;

/// Captured result of an external command that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: &str) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: &str) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Best single-line description of why the command failed.
    pub fn reason(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        match (text.lines().next(), self.code) {
            (Some(line), _) => line.to_string(),
            (None, Some(code)) => format!("exit status {code}"),
            (None, None) => "terminated by signal".to_string(),
        }
    }
}

/// Process execution seam shared by every command-driven collaborator.
///
/// Commands are awaited without a timeout. A hanging command blocks the run.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` and captures its output. Errors only if it could not be spawned.
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<CommandOutput>;

    /// Whether `program` resolves on the search path.
    fn exists(&self, program: &str) -> bool;
}

/// Source of the interface inventory.
pub trait InterfaceSource: Send + Sync {
    fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, DiscoveryError>;
}

pub trait PackageInstaller: Send + Sync {
    /// Installs `package` unless it is already present.
    fn install(&self, package: &str) -> anyhow::Result<()>;
}

/// The share being exported and how the daemon should log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareSpec {
    pub path: PathBuf,
    pub name: String,
    pub verbose_logging: bool,
}

pub trait ConfigWriter: Send + Sync {
    /// Creates the share directory if needed and hands it to the guest account.
    fn prepare_share(&self, share: &ShareSpec) -> anyhow::Result<()>;

    /// Backs up an existing configuration once, then writes the generated one.
    fn write_config(
        &self,
        iface: &NetworkInterface,
        protocol: ProtocolVersion,
        share: &ShareSpec,
    ) -> anyhow::Result<()>;

    /// Runs the daemon's own syntax check on the written file.
    fn validate(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Enable,
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Enable => "enable",
        };
        f.write_str(s)
    }
}

/// Distribution specific unit names of the file server and its name service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNames {
    pub main: String,
    pub netbios: Option<String>,
}

impl ServiceNames {
    pub fn all(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.main.as_str()).chain(self.netbios.as_deref())
    }
}

pub trait ServiceControl: Send + Sync {
    fn resolve_names(&self) -> ServiceNames;
    fn control(&self, name: &str, action: ServiceAction) -> anyhow::Result<()>;
    fn is_active(&self, name: &str) -> bool;
}

pub trait SocketProbe: Send + Sync {
    fn listening_sockets(&self) -> anyhow::Result<Vec<ListeningSocket>>;
}

/// Facts used to decide which firewall backend governs the host.
pub trait FirewallProbe: Send + Sync {
    fn command_available(&self, backend: FirewallBackend) -> bool;
    fn service_active(&self, backend: FirewallBackend) -> bool;
}

pub trait SecurityContext: Send + Sync {
    /// Labels `path` for the file server. A no-op where SELinux is absent or disabled.
    fn apply(&self, path: &Path) -> anyhow::Result<()>;
}
