// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Host Overview Service
//!
//! Implements the "interfaces" use case.
//!
//! A read-only snapshot of what a run would see before it changes anything:
//! the interface inventory with candidates marked, the governing firewall
//! backend, and whatever already listens on the SMB ports.

use sambind_common::models::binding::ListeningSocket;
use sambind_common::models::firewall::RuleIntent;
use sambind_common::models::interface::NetworkInterface;

use crate::firewall::{self, Detection};
use crate::provision::Collaborators;

pub struct HostOverview {
    pub interfaces: Vec<NetworkInterface>,
    pub firewall: Detection,
    /// Sockets on any declared SMB port.
    pub listeners: Vec<ListeningSocket>,
}

impl HostOverview {
    pub fn candidates(&self) -> impl Iterator<Item = &NetworkInterface> {
        self.interfaces.iter().filter(|i| i.is_binding_candidate())
    }
}

/// Application service for the pre-flight overview.
pub struct InfoService<'a> {
    host: Collaborators<'a>,
}

impl<'a> InfoService<'a> {
    pub fn new(host: Collaborators<'a>) -> Self {
        Self { host }
    }

    pub fn overview(&self) -> anyhow::Result<HostOverview> {
        let interfaces = self.host.interfaces.list_interfaces()?;
        let firewall = firewall::detect(self.host.firewall);

        let ports = RuleIntent::samba().declared_ports();
        let listeners = self
            .host
            .sockets
            .listening_sockets()?
            .into_iter()
            .filter(|s| ports.contains(&s.port))
            .collect();

        Ok(HostOverview {
            interfaces,
            firewall,
            listeners,
        })
    }
}
