// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Diagnostics
//!
//! Two troubleshooting aids that never change the host:
//!
//! * [`generate_report`] collects system, configuration, service, socket,
//!   firewall and log state into one text file that can be attached to a bug
//!   report.
//! * [`LogMonitor`] follows the daemon log for a bounded time so connection
//!   attempts from a client can be watched live.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use chrono::{Local, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use sambind_common::models::firewall::RuleIntent;
use sambind_common::{debug, success};

use crate::firewall;
use crate::provision::Collaborators;

/// Ports that make a socket line worth reporting.
const SMB_PORTS: [u16; 4] = [445, 139, 137, 138];

const LOG_TAIL: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub title: &'static str,
    pub body: String,
}

impl ReportSection {
    fn new(title: &'static str, body: impl Into<String>) -> Self {
        Self {
            title,
            body: body.into(),
        }
    }
}

fn command_text(host: &Collaborators<'_>, program: &str, args: &[&str]) -> String {
    match host.runner.run(program, args) {
        Ok(out) if out.success() => out.stdout,
        Ok(out) => format!("{program} failed: {}\n", out.reason()),
        Err(e) => format!("{program} unavailable: {e}\n"),
    }
}

/// Last `n` lines of `content`.
pub fn tail_lines(content: &str, n: usize) -> Vec<String> {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].iter().map(|l| l.to_string()).collect()
}

/// Gathers every report section. Individual failures end up as text in their
/// section rather than aborting the report.
pub fn collect_sections(host: &Collaborators<'_>, logs: &[PathBuf]) -> Vec<ReportSection> {
    let mut sections = vec![
        ReportSection::new("SYSTEM", command_text(host, "uname", &["-a"])),
        ReportSection::new("CONFIGURATION", command_text(host, "testparm", &["-s"])),
    ];

    let names = host.services.resolve_names();
    let mut services = String::new();
    for name in names.all() {
        services.push_str(&format!("{name} status:\n"));
        services.push_str(&command_text(host, "systemctl", &["status", name]));
        services.push('\n');
    }
    sections.push(ReportSection::new("SERVICES", services));

    let network = match host.interfaces.list_interfaces() {
        Ok(ifaces) => ifaces
            .iter()
            .map(|i| {
                let addrs: Vec<String> = i.addresses.iter().map(|a| a.to_string()).collect();
                let state = if i.is_up { "up" } else { "down" };
                format!("{} [{}, {state}] {}\n", i.name, i.kind, addrs.join(" "))
            })
            .collect::<String>(),
        Err(e) => format!("{e}\n"),
    };
    sections.push(ReportSection::new("NETWORK", network));

    let ports = match host.sockets.listening_sockets() {
        Ok(sockets) => sockets
            .iter()
            .filter(|s| SMB_PORTS.contains(&s.port))
            .map(|s| format!("{s}\n"))
            .collect::<String>(),
        Err(e) => format!("{e}\n"),
    };
    sections.push(ReportSection::new("PORTS", ports));

    let detection = firewall::detect(host.firewall);
    let mut fw = format!("backend: {}\n", detection.selected);
    if detection.is_ambiguous() {
        let others: Vec<String> = detection.also_active.iter().map(|b| b.to_string()).collect();
        fw.push_str(&format!("also active: {}\n", others.join(", ")));
    }
    if let Ok(ifaces) = host.interfaces.list_interfaces() {
        for iface in ifaces.iter().filter(|i| i.is_binding_candidate()) {
            match firewall::observe(&detection, host.runner, &RuleIntent::samba(), iface) {
                Ok(outcome) => {
                    let open: Vec<String> =
                        RuleIntent::samba()
                            .ports
                            .iter()
                            .filter(|p| outcome.covers(**p, &iface.name))
                            .map(|p| p.to_string())
                            .collect();
                    fw.push_str(&format!("{}: open {}\n", iface.name, open.join(" ")));
                }
                Err(e) => fw.push_str(&format!("{}: {e}\n", iface.name)),
            }
        }
    }
    sections.push(ReportSection::new("FIREWALL", fw));

    let mut log_text = String::new();
    for path in logs {
        match fs::read_to_string(path) {
            Ok(content) => {
                log_text.push_str(&format!("{}:\n", path.display()));
                for line in tail_lines(&content, LOG_TAIL) {
                    log_text.push_str(&line);
                    log_text.push('\n');
                }
            }
            Err(e) => debug!(verbosity = 1, "Skipping {}: {e}", path.display()),
        }
    }
    sections.push(ReportSection::new("RECENT LOGS", log_text));

    sections
}

pub fn render_report(sections: &[ReportSection]) -> String {
    let mut out = String::from("SAMBIND DIAGNOSTIC REPORT\n");
    out.push_str(&"=".repeat(50));
    out.push('\n');
    out.push_str(&format!("Generated: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S %Z")));

    for section in sections {
        out.push('\n');
        out.push_str(section.title);
        out.push('\n');
        out.push_str(&"-".repeat(section.title.len()));
        out.push('\n');
        out.push_str(&section.body);
        if !section.body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Writes `sambind_report_<unix time>.txt` into `dir` and returns its path.
pub fn generate_report(host: &Collaborators<'_>, dir: &Path) -> anyhow::Result<PathBuf> {
    let logs = [
        PathBuf::from("/var/log/samba/log.smbd"),
        PathBuf::from("/var/log/samba/log.nmbd"),
    ];
    let sections = collect_sections(host, &logs);
    let path = dir.join(format!("sambind_report_{}.txt", Utc::now().timestamp()));

    fs::write(&path, render_report(&sections))
        .with_context(|| format!("failed to write {}", path.display()))?;

    success!("Report saved to {}", path.display());
    Ok(path)
}

/// Something the monitor has to tell its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// A new line in the followed log, stamped with local wall-clock time.
    Line { timestamp: String, text: String },
    /// The main log is missing; these are the last lines of an alternative.
    Fallback { path: PathBuf, lines: Vec<String> },
    NoLogFound,
    /// The operator stopped monitoring early.
    Interrupted,
}

pub struct LogMonitor {
    primary: PathBuf,
    alternatives: Vec<PathBuf>,
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new(
            "/var/log/samba/log.smbd",
            &[
                "/var/log/samba/log.smb",
                "/var/log/samba/smbd.log",
                "/var/log/samba.log",
            ],
        )
    }
}

impl LogMonitor {
    pub fn new(primary: impl Into<PathBuf>, alternatives: &[&str]) -> Self {
        Self {
            primary: primary.into(),
            alternatives: alternatives.iter().map(PathBuf::from).collect(),
        }
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    /// Follows the primary log for `duration`, or shows the tail of the first
    /// alternative that exists when the primary is missing.
    pub async fn run<F>(&self, duration: Duration, mut sink: F) -> anyhow::Result<()>
    where
        F: FnMut(MonitorEvent),
    {
        if !self.primary.exists() {
            sink(self.fallback());
            return Ok(());
        }

        let mut child = Command::new("tail")
            .arg("-F")
            .arg("-n")
            .arg("0")
            .arg(&self.primary)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("failed to start tail")?;

        let stdout = child.stdout.take().context("tail has no stdout")?;
        let mut lines = BufReader::new(stdout).lines();
        let deadline = tokio::time::Instant::now() + duration;

        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(text) => sink(MonitorEvent::Line {
                        timestamp: Local::now().format("%H:%M:%S").to_string(),
                        text,
                    }),
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline) => break,
                _ = tokio::signal::ctrl_c() => {
                    sink(MonitorEvent::Interrupted);
                    break;
                }
            }
        }

        let _ = child.kill().await;
        Ok(())
    }

    fn fallback(&self) -> MonitorEvent {
        for path in &self.alternatives {
            if let Ok(content) = fs::read_to_string(path) {
                return MonitorEvent::Fallback {
                    path: path.clone(),
                    lines: tail_lines(&content, 20),
                };
            }
        }
        MonitorEvent::NoLogFound
    }
}
