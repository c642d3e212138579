// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Firewall Model
//!
//! Backend-neutral description of what should be opened ([`RuleIntent`]) and of
//! what a backend actually opened or currently has open ([`RuleOutcome`]).
//!
//! Zones only exist for firewalld. For ufw and iptables every grant is global,
//! which [`ZoneScope::Global`] expresses.

use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FirewallBackend {
    Firewalld,
    Ufw,
    Iptables,
    NoneDetected,
}

impl FirewallBackend {
    /// Detection order. The first active backend wins.
    pub const PRIORITY: [FirewallBackend; 3] = [
        FirewallBackend::Firewalld,
        FirewallBackend::Ufw,
        FirewallBackend::Iptables,
    ];

    /// Binary that controls the backend.
    pub fn command(self) -> Option<&'static str> {
        match self {
            FirewallBackend::Firewalld => Some("firewall-cmd"),
            FirewallBackend::Ufw => Some("ufw"),
            FirewallBackend::Iptables => Some("iptables"),
            FirewallBackend::NoneDetected => None,
        }
    }
}

impl fmt::Display for FirewallBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FirewallBackend::Firewalld => "firewalld",
            FirewallBackend::Ufw => "ufw",
            FirewallBackend::Iptables => "iptables",
            FirewallBackend::NoneDetected => "none-detected",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Transport {
    Tcp,
    Udp,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Tcp => f.write_str("tcp"),
            Transport::Udp => f.write_str("udp"),
        }
    }
}

/// A single port and its transport, rendered as `445/tcp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortSpec {
    pub port: u16,
    pub transport: Transport,
}

impl PortSpec {
    pub const fn tcp(port: u16) -> Self {
        Self {
            port,
            transport: Transport::Tcp,
        }
    }

    pub const fn udp(port: u16) -> Self {
        Self {
            port,
            transport: Transport::Udp,
        }
    }

    /// Parses the `445/tcp` notation used by firewalld and ufw.
    pub fn parse(raw: &str) -> Option<Self> {
        let (port, proto) = raw.trim().split_once('/')?;
        let port: u16 = port.parse().ok()?;
        let transport = match proto {
            "tcp" => Transport::Tcp,
            "udp" => Transport::Udp,
            _ => return None,
        };
        Some(Self { port, transport })
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.transport)
    }
}

/// firewalld zone and the interfaces bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirewallZone {
    pub name: String,
    pub interfaces: BTreeSet<String>,
}

impl FirewallZone {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            interfaces: BTreeSet::new(),
        }
    }

    pub fn with_interface(mut self, iface: &str) -> Self {
        self.interfaces.insert(iface.to_string());
        self
    }
}

/// Where a grant applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ZoneScope {
    /// Backends without zones. Covers every interface.
    Global,
    Zone(String),
}

impl fmt::Display for ZoneScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneScope::Global => f.write_str("global"),
            ZoneScope::Zone(z) => write!(f, "zone {z}"),
        }
    }
}

/// What the orchestrator wants open, independent of backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleIntent {
    pub ports: BTreeSet<PortSpec>,
    /// Symbolic service name understood by firewalld (`samba`).
    pub service_name: Option<String>,
    /// Explicit zones. Empty means "whatever zones govern the binding interface".
    pub target_zones: BTreeSet<String>,
    /// The port whose absence means the daemon is down.
    pub primary: PortSpec,
}

impl RuleIntent {
    /// Ports used by the SMB daemon and its NetBIOS companions.
    pub fn samba() -> Self {
        let ports = [
            PortSpec::tcp(445),
            PortSpec::tcp(139),
            PortSpec::udp(137),
            PortSpec::udp(138),
        ]
        .into_iter()
        .collect();

        Self {
            ports,
            service_name: Some("samba".to_string()),
            target_zones: BTreeSet::new(),
            primary: PortSpec::tcp(445),
        }
    }

    pub fn declared_ports(&self) -> BTreeSet<u16> {
        self.ports.iter().map(|p| p.port).collect()
    }
}

/// A port that is open for a given scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortGrant {
    pub port: PortSpec,
    pub scope: ZoneScope,
}

/// Per-backend result of applying or observing rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub backend: FirewallBackend,
    /// At least one rule is in place for the intent.
    pub applied: bool,
    pub errors: Vec<String>,
    /// Limitations the operator should know about (e.g. missing persistence).
    pub warnings: Vec<String>,
    pub grants: BTreeSet<PortGrant>,
    /// Zone bindings seen while applying. Empty for zone-less backends.
    pub zones: Vec<FirewallZone>,
    /// Zone used for interfaces that are not bound anywhere.
    pub default_zone: Option<String>,
    /// Number of individual rule operations attempted.
    pub attempted: usize,
}

impl RuleOutcome {
    pub fn new(backend: FirewallBackend) -> Self {
        Self {
            backend,
            applied: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            grants: BTreeSet::new(),
            zones: Vec::new(),
            default_zone: None,
            attempted: 0,
        }
    }

    /// Outcome for a host without any firewall: nothing to apply, nothing missing.
    pub fn skipped() -> Self {
        Self::new(FirewallBackend::NoneDetected)
    }

    pub fn grant(&mut self, port: PortSpec, scope: ZoneScope) {
        self.grants.insert(PortGrant { port, scope });
        self.applied = true;
    }

    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty() && self.applied
    }

    /// Zone that governs `iface`: the zone it is bound to, else the default zone.
    pub fn effective_zone(&self, iface: &str) -> Option<&str> {
        self.zones
            .iter()
            .find(|z| z.interfaces.contains(iface))
            .map(|z| z.name.as_str())
            .or(self.default_zone.as_deref())
    }

    /// Whether traffic for `port` arriving on `iface` is allowed by a recorded grant.
    pub fn covers(&self, port: PortSpec, iface: &str) -> bool {
        let zone = self.effective_zone(iface);
        self.grants.iter().any(|g| {
            g.port == port
                && match &g.scope {
                    ZoneScope::Global => true,
                    ZoneScope::Zone(name) => Some(name.as_str()) == zone,
                }
        })
    }
}
