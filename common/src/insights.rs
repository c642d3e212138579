// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use rand::seq::SliceRandom;
use rand::{Rng, rng};

/// Operational guidance shown while long host commands run.
const SETUP_TIPS: &[&str] = &[
    "Use --unattended to accept every default without waiting",
    "'sambind verify --interface <name>' re-checks a running setup",
    "'sambind report' collects everything needed for a bug report",
    "Bridges like virbr0 often live in their own firewalld zone",
    "iptables rules vanish on reboot unless you persist them",
    "A daemon on 0.0.0.0 ignores the interface you picked",
];

/// Background facts about the protocols involved.
const PROTOCOL_TRIVIA: &[&str] = &[
    "Port 445 carries SMB directly over TCP, no NetBIOS needed",
    "Ports 137 and 138 are NetBIOS name and datagram services",
    "SMBv1 dates back to the 1980s and is disabled by default on modern Windows",
    "SMB3 added end-to-end encryption",
];

/// Generates a randomized list of spinner messages.
///
/// Every slot has a 50% chance of being a tip and a 50% chance of being trivia,
/// as long as both pools still have items left.
pub fn get_shuffled_insights() -> Vec<&'static str> {
    let mut rng = rng();

    let mut tips = SETUP_TIPS.to_vec();
    tips.shuffle(&mut rng);

    let mut trivia = PROTOCOL_TRIVIA.to_vec();
    trivia.shuffle(&mut rng);

    let mut output = Vec::with_capacity(tips.len() + trivia.len());

    while !tips.is_empty() && !trivia.is_empty() {
        if rng.random_bool(0.5) {
            output.push(tips.remove(0));
        } else {
            output.push(trivia.remove(0));
        }
    }

    output.extend(tips);
    output.extend(trivia);
    output
}
