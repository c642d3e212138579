// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::fmt;

use crate::models::selection::{SelectionList, SelectionOption};

/// Range of SMB dialects the daemon will negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolVersion {
    /// SMBv1 through SMBv3. Works with the oldest clients.
    #[default]
    MinCompat,
    /// SMBv2 through SMBv3.
    Balanced,
    /// SMBv3 only.
    SecureOnly,
}

impl ProtocolVersion {
    pub const ALL: [ProtocolVersion; 3] = [
        ProtocolVersion::MinCompat,
        ProtocolVersion::Balanced,
        ProtocolVersion::SecureOnly,
    ];

    /// `(min protocol, max protocol)` as written into the daemon configuration.
    pub fn bounds(self) -> (&'static str, &'static str) {
        match self {
            ProtocolVersion::MinCompat => ("NT1", "SMB3"),
            ProtocolVersion::Balanced => ("SMB2", "SMB3"),
            ProtocolVersion::SecureOnly => ("SMB3", "SMB3"),
        }
    }

    fn hints(self) -> Vec<String> {
        let lines: &[&str] = match self {
            ProtocolVersion::MinCompat => &[
                "Maximum compatibility, includes legacy Windows clients",
                "Least secure: SMBv1 is enabled",
            ],
            ProtocolVersion::Balanced => &[
                "Windows 7 and newer",
                "Good balance of security and compatibility",
            ],
            ProtocolVersion::SecureOnly => &[
                "Windows 8 and newer only",
                "Most secure, requires modern clients",
            ],
        };
        lines.iter().map(|l| l.to_string()).collect()
    }

    /// Prompt options in fixed order; the compatibility range is the default.
    pub fn options() -> SelectionList<ProtocolVersion> {
        let options = Self::ALL
            .iter()
            .enumerate()
            .map(|(index, version)| SelectionOption {
                index,
                label: version.to_string(),
                hints: version.hints(),
                value: *version,
            })
            .collect();
        SelectionList::new(options).unwrap_or_else(|| unreachable!("ALL is non-empty"))
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (min, max) = self.bounds();
        let name = match self {
            ProtocolVersion::MinCompat => "min-compat",
            ProtocolVersion::Balanced => "balanced",
            ProtocolVersion::SecureOnly => "secure-only",
        };
        write!(f, "{name} ({min} to {max})")
    }
}
