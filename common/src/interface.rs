// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use crate::debug;
use crate::error::DiscoveryError;
use crate::models::interface::{InterfaceKind, NetworkInterface};
use crate::system::InterfaceSource;
#[cfg(target_os = "linux")]
use linux_impl::{is_bridge, is_physical};
use pnet::datalink;

/// Interface inventory backed by the OS (via `pnet`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, DiscoveryError> {
        list_interfaces()
    }
}

/// Enumerates every interface in OS discovery order, loopback included.
///
/// A functioning host always reports at least the loopback device, so an empty
/// answer means the query itself failed.
pub fn list_interfaces() -> Result<Vec<NetworkInterface>, DiscoveryError> {
    let raw: Vec<datalink::NetworkInterface> = datalink::interfaces();
    if raw.is_empty() {
        return Err(DiscoveryError {
            reason: "the operating system reported no interfaces, not even loopback".into(),
        });
    }

    let interfaces: Vec<NetworkInterface> = raw
        .iter()
        .map(|intf| snapshot(intf, classify(intf, is_physical, is_bridge)))
        .collect();

    debug!(
        verbosity = 1,
        "Inventory returned {} interfaces: {}",
        interfaces.len(),
        interfaces
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(interfaces)
}

/// Interfaces the operator may bind to, in inventory order.
pub fn binding_candidates(interfaces: &[NetworkInterface]) -> Vec<NetworkInterface> {
    interfaces
        .iter()
        .filter(|i| i.is_binding_candidate())
        .cloned()
        .collect()
}

fn snapshot(intf: &datalink::NetworkInterface, kind: InterfaceKind) -> NetworkInterface {
    NetworkInterface {
        name: intf.name.clone(),
        addresses: intf.ips.clone(),
        is_up: intf.is_up(),
        kind,
    }
}

fn classify(
    intf: &datalink::NetworkInterface,
    is_physical: impl Fn(&datalink::NetworkInterface) -> bool,
    is_bridge: impl Fn(&datalink::NetworkInterface) -> bool,
) -> InterfaceKind {
    if intf.is_loopback() {
        InterfaceKind::Loopback
    } else if is_bridge(intf) {
        InterfaceKind::Bridge
    } else if is_physical(intf) {
        InterfaceKind::Physical
    } else {
        InterfaceKind::Virtual
    }
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_physical(interface: &datalink::NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/device", interface.name)).exists()
    }

    pub fn is_bridge(interface: &datalink::NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/bridge", interface.name)).exists()
    }
}

#[cfg(not(target_os = "linux"))]
fn is_physical(_interface: &datalink::NetworkInterface) -> bool {
    true
}

#[cfg(not(target_os = "linux"))]
fn is_bridge(_interface: &datalink::NetworkInterface) -> bool {
    false
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
