// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Transient data shared between the engine and its collaborators.
//!
//! Nothing in here is persisted. Every value is recomputed per run and owned by
//! the call that produced it.

pub mod binding;
pub mod firewall;
pub mod interface;
pub mod protocol;
pub mod selection;
