// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::process::Command;

use anyhow::Context;

use sambind_common::debug;
use sambind_common::system::{CommandOutput, CommandRunner};

/// Spawns processes on the local machine and waits for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostCommands;

impl CommandRunner for HostCommands {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<CommandOutput> {
        debug!(verbosity = 2, "$ {program} {}", args.join(" "));

        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute {program}"))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
