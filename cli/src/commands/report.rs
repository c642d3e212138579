// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::env;

use sambind_core::diagnostics;
use sambind_core::system::HostSystem;

use crate::terminal::print::{self, Print};

pub fn report() -> anyhow::Result<()> {
    Print::header("diagnostic report");
    let host = HostSystem::new();
    let path = diagnostics::generate_report(&host.collaborators(), &env::temp_dir())?;
    print::aligned_line("Saved to", path.display().to_string());
    print::print_status("Attach this file when asking for help");
    Ok(())
}
