// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use sambind_common::system::{CommandRunner, ServiceAction, ServiceControl, ServiceNames};
use sambind_common::{debug, warn};

use super::HostCommands;

/// Unit name pairs used by the major distributions, most common first.
const CANDIDATES: &[(&str, Option<&str>)] = &[
    ("smb", Some("nmb")),
    ("smbd", Some("nmbd")),
    ("samba", Some("nmb")),
    ("samba", Some("winbind")),
];

/// Service control through systemd.
#[derive(Default)]
pub struct SystemdServices<R = HostCommands> {
    runner: R,
}

impl<R: CommandRunner> SystemdServices<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    fn unit_exists(&self, name: &str) -> bool {
        let unit = format!("{name}.service");
        match self.runner.run("systemctl", &["list-unit-files", unit.as_str()]) {
            Ok(out) => out.stdout.contains(&unit),
            Err(_) => false,
        }
    }
}

impl<R: CommandRunner> ServiceControl for SystemdServices<R> {
    fn resolve_names(&self) -> ServiceNames {
        for &(main, netbios) in CANDIDATES {
            if self.unit_exists(main) {
                debug!(verbosity = 1, "Using service units {main}, {netbios:?}");
                return ServiceNames {
                    main: main.to_string(),
                    netbios: netbios.map(str::to_string),
                };
            }
        }

        warn!("No Samba unit file found, assuming smbd/nmbd");
        ServiceNames {
            main: "smbd".to_string(),
            netbios: Some("nmbd".to_string()),
        }
    }

    fn control(&self, name: &str, action: ServiceAction) -> anyhow::Result<()> {
        let verb = action.to_string();
        let out = self.runner.run("systemctl", &[verb.as_str(), name])?;
        if !out.success() {
            anyhow::bail!("systemctl {verb} {name}: {}", out.reason());
        }
        Ok(())
    }

    fn is_active(&self, name: &str) -> bool {
        match self.runner.run("systemctl", &["is-active", name]) {
            Ok(out) => out.stdout.trim() == "active",
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use sambind_common::system::CommandOutput;

    use super::*;
    use crate::firewall::testing::FakeRunner;

    #[test]
    fn debian_units_are_found_second() {
        let runner = FakeRunner::default().answer(
            "systemctl list-unit-files smbd.service",
            CommandOutput::ok("UNIT FILE     STATE\nsmbd.service  enabled\n"),
        );
        let names = SystemdServices::new(runner).resolve_names();
        assert_eq!(names.main, "smbd");
        assert_eq!(names.netbios.as_deref(), Some("nmbd"));
    }

    #[test]
    fn falls_back_to_smbd_when_nothing_matches() {
        let names = SystemdServices::new(FakeRunner::default()).resolve_names();
        assert_eq!(names.main, "smbd");
    }

    #[test]
    fn failed_start_carries_reason() {
        let runner = FakeRunner::default().answer(
            "systemctl start smb",
            CommandOutput::failed(5, "Unit smb.service not found."),
        );
        let err = SystemdServices::new(runner)
            .control("smb", ServiceAction::Start)
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn inactive_output_is_not_active() {
        let runner = FakeRunner::default()
            .answer("systemctl is-active smb", CommandOutput::failed(3, ""));
        assert!(!SystemdServices::new(runner).is_active("smb"));
    }
}
