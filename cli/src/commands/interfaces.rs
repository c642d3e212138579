// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use colored::*;

use sambind_common::models::firewall::FirewallBackend;
use sambind_common::{info, warn};
use sambind_core::info::InfoService;
use sambind_core::system::HostSystem;

use crate::sprint;
use crate::terminal::{
    network_fmt,
    print::{self, Print},
};

pub fn interfaces() -> anyhow::Result<()> {
    let host = HostSystem::new();
    let overview = InfoService::new(host.collaborators()).overview()?;

    Print::header("network interfaces");
    let mut option = 0;
    for (idx, iface) in overview.interfaces.iter().enumerate() {
        let index = iface.is_binding_candidate().then(|| {
            option += 1;
            option - 1
        });
        network_fmt::print_interface(iface, index);
        if idx + 1 != overview.interfaces.len() {
            sprint!();
        }
    }
    if overview.candidates().next().is_none() {
        warn!("No interface qualifies for binding (up, not loopback, with IPv4)");
    }

    Print::header("firewall");
    let backend = overview.firewall.selected;
    let value = match backend {
        FirewallBackend::NoneDetected => backend.to_string().yellow(),
        _ => backend.to_string().green().bold(),
    };
    print::aligned_line("Backend", value);
    if overview.firewall.is_ambiguous() {
        let others: Vec<String> = overview
            .firewall
            .also_active
            .iter()
            .map(|b| b.to_string())
            .collect();
        print::aligned_line("Also active", others.join(", "));
    }

    Print::header("smb listeners");
    if overview.listeners.is_empty() {
        info!("Nothing is listening on the SMB ports");
    }
    for socket in &overview.listeners {
        print::print_status(network_fmt::socket_line(socket));
    }
    Ok(())
}
