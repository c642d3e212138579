// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use colored::*;
use is_root::is_root;
use tracing::info_span;

use sambind_common::config::Config;
use sambind_common::error::ProvisionError;
use sambind_common::utils::input::StdinInput;
use sambind_common::{info, success, warn};
use sambind_core::prompt::TimedPrompt;
use sambind_core::provision::{Choices, Provisioner, RunSummary};
use sambind_core::system::HostSystem;

use crate::commands::verify::{print_firewall, print_report};
use crate::terminal::{
    colors,
    countdown::TerminalCountdown,
    print::{self, Print},
    spinner::SpinnerGuard,
};

pub async fn setup(cfg: &Config) -> anyhow::Result<()> {
    if !is_root() {
        return Err(ProvisionError::MissingPrivileges.into());
    }

    Print::header("provisioning");
    print::aligned_line("Share path", cfg.share_path.display().to_string());
    print::aligned_line("Share name", cfg.share_name.as_str());
    if cfg.debug {
        info!("Debug mode: the daemon will log verbosely");
    }

    let host = HostSystem::new();
    let prompt = (!cfg.unattended).then(|| {
        TimedPrompt::new(
            Box::new(StdinInput::new()),
            Arc::new(TerminalCountdown),
            cfg.prompt_timeout,
        )
    });

    let mut provisioner = Provisioner::new(host.collaborators(), cfg, prompt);
    let choices = provisioner.select().await?;

    Print::header("applying");
    // The prompt took over SIGINT, so an interrupt has to be honoured here too.
    let summary = {
        let _guard = run_spinner(&choices);
        tokio::select! {
            summary = provisioner.apply(choices) => summary?,
            _ = tokio::signal::ctrl_c() => anyhow::bail!("interrupted while applying the configuration"),
        }
    };

    print_summary(&summary);

    match summary.failure() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn run_spinner(choices: &Choices) -> SpinnerGuard {
    let span = info_span!("setup", indicatif.pb_show = true);
    let _enter = span.enter();
    let status = format!(
        "Binding {} to {} ({})",
        choices.share.name, choices.interface.name, choices.protocol
    );
    SpinnerGuard::with_status(span.clone(), move || status.as_str().color(colors::TEXT_DEFAULT))
}

fn print_summary(summary: &RunSummary) {
    print_firewall(&summary.detection, &summary.firewall, &summary.interface);
    print_report(&summary.report);

    for notice in &summary.notices {
        warn!("{notice}");
    }

    if !summary.succeeded() {
        return;
    }

    Print::header("connect");
    print::aligned_line("Interface", summary.interface.label());
    print::aligned_line("Protocol", summary.protocol.to_string());
    print::aligned_line("Share path", summary.share.path.display().to_string());
    if let Some(unc) = summary.unc_path() {
        print::aligned_line("Address", unc.color(colors::SECONDARY).bold());
    }
    print::print_status("No username or password needed, access is anonymous");

    if Print::quiet_level() == 0 {
        Print::header("management");
        print::print_status("Status ........ sudo systemctl status smbd");
        print::print_status("Config test ... sudo testparm");
        print::print_status("Re-check ...... sudo sambind verify -i <iface>");
        print::print_status("Live log ...... sudo sambind monitor");
    }

    let done = format!("Share '{}' is ready", summary.share.name.as_str().bold().green())
        .color(colors::TEXT_DEFAULT);
    match Print::quiet_level() {
        0 => {
            print::divider();
            print::centerln(&done.to_string());
        }
        _ => success!("{done}"),
    }
}
