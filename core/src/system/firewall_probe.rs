// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use sambind_common::models::firewall::FirewallBackend;
use sambind_common::system::{CommandRunner, FirewallProbe};

use super::HostCommands;

/// Answers the two detection questions by asking each backend's own tooling.
#[derive(Default)]
pub struct HostFirewallProbe<R = HostCommands> {
    runner: R,
}

impl<R: CommandRunner> HostFirewallProbe<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    fn stdout_of(&self, program: &str, args: &[&str]) -> Option<String> {
        self.runner
            .run(program, args)
            .ok()
            .map(|out| out.stdout.trim().to_string())
    }

    fn succeeds(&self, program: &str, args: &[&str]) -> bool {
        matches!(self.runner.run(program, args), Ok(out) if out.success())
    }
}

impl<R: CommandRunner> FirewallProbe for HostFirewallProbe<R> {
    fn command_available(&self, backend: FirewallBackend) -> bool {
        backend
            .command()
            .is_some_and(|cmd| self.runner.exists(cmd))
    }

    fn service_active(&self, backend: FirewallBackend) -> bool {
        match backend {
            FirewallBackend::Firewalld => {
                let unit = self.stdout_of("systemctl", &["is-active", "firewalld"]);
                unit.as_deref() == Some("active")
                    || self.stdout_of("firewall-cmd", &["--state"]).as_deref() == Some("running")
            }
            FirewallBackend::Ufw => self
                .stdout_of("ufw", &["status"])
                .and_then(|s| s.lines().next().map(|l| l.trim() == "Status: active"))
                .unwrap_or(false),
            // iptables has no daemon; a readable INPUT chain means the tables are live
            FirewallBackend::Iptables => self.succeeds("iptables", &["-S", "INPUT"]),
            FirewallBackend::NoneDetected => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use sambind_common::system::CommandOutput;

    use super::*;
    use crate::firewall::testing::FakeRunner;

    #[test]
    fn inactive_ufw_is_not_active() {
        let runner = FakeRunner::default()
            .answer("ufw status", CommandOutput::ok("Status: inactive\n"));
        let probe = HostFirewallProbe::new(runner);
        assert!(probe.command_available(FirewallBackend::Ufw));
        assert!(!probe.service_active(FirewallBackend::Ufw));
    }

    #[test]
    fn firewalld_state_is_a_fallback() {
        let runner = FakeRunner::default()
            .answer("systemctl is-active firewalld", CommandOutput::failed(3, ""))
            .answer("firewall-cmd --state", CommandOutput::ok("running\n"));
        assert!(HostFirewallProbe::new(runner).service_active(FirewallBackend::Firewalld));
    }

    #[test]
    fn missing_binary_is_not_available() {
        let probe = HostFirewallProbe::new(FakeRunner::default().without("iptables"));
        assert!(!probe.command_available(FirewallBackend::Iptables));
        assert!(!probe.service_active(FirewallBackend::Iptables));
        assert!(!probe.command_available(FirewallBackend::NoneDetected));
    }
}
