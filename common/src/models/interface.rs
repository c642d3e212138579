// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Network Interface Snapshot
//!
//! A [`NetworkInterface`] is an immutable picture of one host interface taken at
//! inventory time. It deliberately carries less than the OS reports: the engine
//! only needs a name to write into the daemon config, the addresses to compare
//! listening sockets against, and a kind to decide which firewall zones apply.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use pnet::ipnetwork::IpNetwork;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    Physical,
    Virtual,
    /// Software bridge, typically created by a hypervisor (`virbr0`, `br0`).
    Bridge,
    Loopback,
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InterfaceKind::Physical => "physical",
            InterfaceKind::Virtual => "virtual",
            InterfaceKind::Bridge => "bridge",
            InterfaceKind::Loopback => "loopback",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub name: String,
    /// Addresses with their prefix length, in the order the OS reported them.
    pub addresses: Vec<IpNetwork>,
    pub is_up: bool,
    pub kind: InterfaceKind,
}

impl NetworkInterface {
    pub fn new(name: &str, addresses: Vec<IpNetwork>, is_up: bool, kind: InterfaceKind) -> Self {
        Self {
            name: name.to_string(),
            addresses,
            is_up,
            kind,
        }
    }

    /// First IPv4 address, used for connection hints and connectivity checks.
    pub fn primary_ipv4(&self) -> Option<Ipv4Addr> {
        self.addresses.iter().find_map(|net| match net {
            IpNetwork::V4(v4) => Some(v4.ip()),
            _ => None,
        })
    }

    pub fn has_ipv4(&self) -> bool {
        self.primary_ipv4().is_some()
    }

    pub fn ips(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.addresses.iter().map(|net| net.ip())
    }

    pub fn owns(&self, ip: IpAddr) -> bool {
        self.ips().any(|own| own == ip)
    }

    /// An interface declaration that stands for "every address".
    ///
    /// This is the case when no concrete address is known or when an address is
    /// the unspecified one (`0.0.0.0` / `::`).
    pub fn is_wildcard(&self) -> bool {
        self.addresses.is_empty() || self.ips().any(|ip| ip.is_unspecified())
    }

    /// A bridge that belongs to a local hypervisor and is usually assigned its own
    /// firewall zone.
    pub fn is_virtualization_bridge(&self) -> bool {
        self.kind == InterfaceKind::Bridge
            || self.name.starts_with("virbr")
            || self.name.starts_with("libvirt")
    }

    /// Interfaces offered to the operator as binding targets.
    pub fn is_binding_candidate(&self) -> bool {
        self.is_up && self.kind != InterfaceKind::Loopback && self.has_ipv4()
    }

    /// Label shown in the selection prompt, e.g. `eth0 (192.168.1.100/24)`.
    pub fn label(&self) -> String {
        let v4 = self.addresses.iter().find(|net| net.is_ipv4());
        match v4 {
            Some(net) => format!("{} ({}/{})", self.name, net.ip(), net.prefix()),
            None => self.name.clone(),
        }
    }
}
