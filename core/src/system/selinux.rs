// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::path::Path;

use sambind_common::system::{CommandRunner, SecurityContext};
use sambind_common::{debug, success};

use super::HostCommands;

const SHARE_TYPE: &str = "samba_share_t";

/// Labels the share for smbd when SELinux is enforcing or permissive.
#[derive(Default)]
pub struct Selinux<R = HostCommands> {
    runner: R,
}

impl<R: CommandRunner> Selinux<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    fn must(&self, program: &str, args: &[&str]) -> anyhow::Result<()> {
        let out = self.runner.run(program, args)?;
        if !out.success() {
            anyhow::bail!("{program} {}: {}", args.join(" "), out.reason());
        }
        Ok(())
    }
}

impl<R: CommandRunner> SecurityContext for Selinux<R> {
    fn apply(&self, path: &Path) -> anyhow::Result<()> {
        let mode = match self.runner.run("getenforce", &[]) {
            Ok(out) if out.success() => out.stdout.trim().to_string(),
            _ => {
                debug!(verbosity = 1, "getenforce unavailable, skipping SELinux labelling");
                return Ok(());
            }
        };

        match mode.as_str() {
            "Disabled" => {
                debug!(verbosity = 1, "SELinux disabled");
                return Ok(());
            }
            "Enforcing" | "Permissive" => {}
            other => anyhow::bail!("unknown SELinux mode '{other}'"),
        }

        let target = path.display().to_string();
        let spec = format!("{target}(/.*)?");
        self.must("semanage", &["fcontext", "-a", "-t", SHARE_TYPE, spec.as_str()])?;
        self.must("restorecon", &["-R", target.as_str()])?;

        if target.starts_with("/home/") {
            self.must("setsebool", &["-P", "samba_enable_home_dirs", "on"])?;
        }

        success!("SELinux context {SHARE_TYPE} applied to {target}");
        Ok(())
    }
}
