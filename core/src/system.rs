// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Host Adapters
//!
//! Real implementations of the collaborator traits from
//! `sambind_common::system`. Every adapter is generic over its
//! [`CommandRunner`] so unit tests can swap in a scripted one, and defaults to
//! [`HostCommands`], which spawns processes on the local machine.

mod command;
mod firewall_probe;
mod packages;
mod samba;
mod selinux;
mod services;
mod sockets;

pub use command::HostCommands;
pub use firewall_probe::HostFirewallProbe;
pub use packages::{DistroPackages, PackageManager};
pub use samba::{CONFIG_PATH, GuestAccount, SambaConfig, configured_protocol, render_config};
pub use selinux::Selinux;
pub use services::SystemdServices;
pub use sockets::{SsSockets, parse_ss};

use sambind_common::interface::SystemInterfaces;
use sambind_common::system::CommandRunner;

use crate::provision::Collaborators;

/// Every adapter wired against the local machine.
#[derive(Default)]
pub struct HostSystem {
    pub runner: HostCommands,
    pub interfaces: SystemInterfaces,
    pub packages: DistroPackages,
    pub config: SambaConfig,
    pub services: SystemdServices,
    pub sockets: SsSockets,
    pub firewall: HostFirewallProbe,
    pub security: Selinux,
}

impl HostSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            interfaces: &self.interfaces,
            packages: &self.packages,
            config: &self.config,
            services: &self.services,
            sockets: &self.sockets,
            firewall: &self.firewall,
            runner: &self.runner as &dyn CommandRunner,
            security: &self.security,
        }
    }
}
