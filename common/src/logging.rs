// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Thin wrappers around `tracing` so the engine crates never call it directly.
//!
//! Every macro tags the event with a `status` field. The CLI formatter reads that
//! field to pick the line prefix, which lets a plain `info` and a `success` share
//! the same level while rendering differently.

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        tracing::info!(status = "info", $($arg)+)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        tracing::info!(status = "success", $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        tracing::debug!(status = "debug", $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        tracing::error!(status = "error", $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        tracing::warn!(status = "warn", $($arg)+)
    };
}

/// A verification finding. Rendered with its own marker so reconciliation
/// output stands apart from ordinary warnings.
#[macro_export]
macro_rules! finding {
    ($($arg:tt)+) => {
        tracing::warn!(status = "finding", $($arg)+)
    };
}
