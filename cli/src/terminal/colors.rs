// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use colored::Color;

// General Purpose
pub const TEXT_DEFAULT: Color = Color::TrueColor {
    r: 212,
    g: 212,
    b: 212,
};

pub const SEPARATOR: Color = Color::BrightBlack;

pub const PRIMARY: Color = Color::TrueColor {
    r: 255,
    g: 204,
    b: 102,
}; // Amber

pub const SECONDARY: Color = Color::TrueColor {
    r: 102,
    g: 204,
    b: 255,
}; // Sky Blue

pub const ACCENT: Color = Color::TrueColor {
    r: 170,
    g: 170,
    b: 0,
};

// Addresses
pub const IPV4_ADDR: Color = Color::TrueColor {
    r: 170,
    g: 255,
    b: 170,
};

pub const IPV4_PREFIX: Color = Color::TrueColor {
    r: 190,
    g: 255,
    b: 190,
};

pub const IPV6_ADDR: Color = Color::TrueColor {
    r: 255,
    g: 102,
    b: 178,
};

pub const IPV6_PREFIX: Color = Color::TrueColor {
    r: 255,
    g: 178,
    b: 217,
};

// Sockets and rules
pub const PORT: Color = Color::TrueColor {
    r: 102,
    g: 255,
    b: 204,
}; // Mint

pub const PROCESS: Color = Color::TrueColor {
    r: 255,
    g: 165,
    b: 0,
};

/// Remaining seconds while the prompt still has plenty of time.
pub const COUNTDOWN: Color = Color::TrueColor {
    r: 255,
    g: 204,
    b: 102,
};

/// Remaining seconds in the last stretch before the default is taken.
pub const COUNTDOWN_LOW: Color = Color::TrueColor {
    r: 255,
    g: 99,
    b: 71,
};
