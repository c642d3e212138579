// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Binding Model
//!
//! Declared intent versus observed runtime state of the daemon, and the report
//! produced by comparing the two.

use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

use crate::models::firewall::Transport;
use crate::models::interface::NetworkInterface;

/// One socket in LISTEN state (or bound, for UDP) as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListeningSocket {
    pub address: IpAddr,
    pub port: u16,
    pub transport: Transport,
    pub pid: Option<u32>,
    pub process: String,
}

impl ListeningSocket {
    pub fn new(address: IpAddr, port: u16, transport: Transport) -> Self {
        Self {
            address,
            port,
            transport,
            pid: None,
            process: String::from("unknown"),
        }
    }

    pub fn with_process(mut self, pid: u32, process: &str) -> Self {
        self.pid = Some(pid);
        self.process = process.to_string();
        self
    }
}

impl fmt::Display for ListeningSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            IpAddr::V6(v6) => write!(f, "[{v6}]:{}/{}", self.port, self.transport)?,
            IpAddr::V4(v4) => write!(f, "{v4}:{}/{}", self.port, self.transport)?,
        }
        match self.pid {
            Some(pid) => write!(f, " ({} pid {pid})", self.process),
            None => write!(f, " ({})", self.process),
        }
    }
}

/// Snapshot compared by the verifier. Built at verification time, never stored.
#[derive(Debug, Clone)]
pub struct BindingState {
    pub declared_interface: NetworkInterface,
    pub declared_ports: BTreeSet<u16>,
    pub actual_listening_sockets: Vec<ListeningSocket>,
}

impl BindingState {
    pub fn sockets_on(&self, port: u16) -> impl Iterator<Item = &ListeningSocket> {
        self.actual_listening_sockets
            .iter()
            .filter(move |s| s.port == port)
    }
}

/// Verification verdict. Variant order is the check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiscrepancyStatus {
    ServiceDown,
    ListeningTooBroad,
    ListeningTooNarrow,
    FirewallRuleMissing,
    Consistent,
}

impl DiscrepancyStatus {
    /// Whether clients can reach the service. A too-broad binding is a security
    /// defect, not a functional one.
    pub fn is_reachable(self) -> bool {
        matches!(
            self,
            DiscrepancyStatus::Consistent | DiscrepancyStatus::ListeningTooBroad
        )
    }
}

impl fmt::Display for DiscrepancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiscrepancyStatus::ServiceDown => "service-down",
            DiscrepancyStatus::ListeningTooBroad => "listening-too-broad",
            DiscrepancyStatus::ListeningTooNarrow => "listening-too-narrow",
            DiscrepancyStatus::FirewallRuleMissing => "firewall-rule-missing",
            DiscrepancyStatus::Consistent => "consistent",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub category: DiscrepancyStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscrepancyReport {
    pub status: DiscrepancyStatus,
    /// Every finding of every category, in check order.
    pub details: Vec<Finding>,
}

impl DiscrepancyReport {
    /// Builds a report whose status is the earliest category among `findings`.
    pub fn from_findings(mut findings: Vec<Finding>) -> Self {
        findings.sort_by_key(|f| f.category);
        let status = findings
            .first()
            .map(|f| f.category)
            .unwrap_or(DiscrepancyStatus::Consistent);
        Self {
            status,
            details: findings,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.status.is_reachable()
    }
}
