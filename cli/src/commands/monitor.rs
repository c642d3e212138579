// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use colored::*;

use sambind_common::{error, info, success, warn};
use sambind_core::diagnostics::{LogMonitor, MonitorEvent};

use crate::sprint;
use crate::terminal::{colors, print::Print};

pub async fn monitor(duration: u64) -> anyhow::Result<()> {
    let monitor = LogMonitor::default();

    Print::header("log monitor");
    info!(
        "Following {} for {duration}s, Ctrl+C stops early",
        monitor.primary().display()
    );

    monitor
        .run(Duration::from_secs(duration), |event| match event {
            MonitorEvent::Line { timestamp, text } => {
                sprint!("{} {}", format!("[{timestamp}]").color(colors::SEPARATOR), text);
            }
            MonitorEvent::Fallback { path, lines } => {
                warn!("Main log not found, last lines of {}:", path.display());
                for line in lines {
                    sprint!("  {}", line.color(colors::TEXT_DEFAULT));
                }
            }
            MonitorEvent::NoLogFound => error!("No Samba log file found"),
            MonitorEvent::Interrupted => info!("Monitoring stopped"),
        })
        .await?;

    success!("Log monitoring finished");
    Ok(())
}
