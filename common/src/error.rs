// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Error Taxonomy
//!
//! Failures of a provisioning run fall into two groups:
//!
//! * [`ProvisionError`]: conditions that abort the run (or mark it failed).
//! * [`Notice`]: conditions that are recorded in the run summary but never abort.
//!
//! Invalid operator input is not part of either group. The prompt recovers from it
//! locally by re-asking, see [`InvalidSelectionInput`].

use std::path::PathBuf;

use thiserror::Error;

use crate::models::firewall::FirewallBackend;

/// The operating system could not be queried for its network interfaces.
#[derive(Debug, Error)]
#[error("failed to enumerate network interfaces: {reason}")]
pub struct DiscoveryError {
    pub reason: String,
}

/// A line typed at a selection prompt that does not name an option.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidSelectionInput {
    #[error("'{0}' is not a number")]
    NotNumeric(String),
    #[error("option {index} does not exist (valid: 0-{max})")]
    OutOfRange { index: usize, max: usize },
}

/// Conditions that abort a run or decide its failure.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("root privileges are required to configure the file-sharing service")]
    MissingPrivileges,

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("no up, non-loopback interface with an IPv4 address is available for binding")]
    NoCandidateInterface,

    #[error("no supported package manager found to install '{package}'")]
    NoPackageManager { package: String },

    #[error("failed to prepare share directory {path}: {reason}")]
    ShareDirectory { path: PathBuf, reason: String },

    #[error("no firewall backend detected and the run requires one")]
    FirewallRequired,

    #[error("the service is not listening on port {port} after configuration")]
    ServiceDownAfterConfig { port: u16 },
}

/// Non-fatal conditions that end up in the run summary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Notice {
    #[error("{selected} selected; also active but left untouched: {}", list_backends(.ignored))]
    BackendDetectionAmbiguous {
        selected: FirewallBackend,
        ignored: Vec<FirewallBackend>,
    },

    #[error("{backend}: {failed} of {total} rule operations failed")]
    RuleApplicationPartialFailure {
        backend: FirewallBackend,
        failed: usize,
        total: usize,
    },

    #[error("no active firewall backend detected, skipping firewall configuration")]
    NoFirewallBackendDetected,

    #[error("{0}")]
    Collaborator(String),
}

fn list_backends(backends: &[FirewallBackend]) -> String {
    backends
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
