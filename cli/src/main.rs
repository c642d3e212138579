// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # sambind CLI Entry Point
//!
//! Bootstraps the runtime and owns the process lifecycle:
//!
//! 1.  **Runtime**: `#[tokio::main]` sets up the async runtime the timed prompt
//!     and the log monitor need.
//! 2.  **Global state**: installs the `tracing` subscriber and the terminal
//!     printer (verbosity, quiet mode, banner).
//! 3.  **Configuration**: maps parsed flags into the core [`Config`].
//! 4.  **Dispatch**: routes to the matching module in `commands/`.
//! 5.  **Error boundary**: any error propagated from a command is logged once
//!     and turned into a non-zero [`ExitCode`].

mod commands;
mod terminal;

use std::process::ExitCode;

use sambind_common::{config::Config, error};

use crate::{
    commands::{CommandLine, Commands, interfaces, monitor, report, setup, verify},
    terminal::{print::Print, spinner},
};

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();
    spinner::init_logging(commands.verbosity);

    let cfg = Config::from(&commands);

    let _ = Print::init(&cfg);
    Print::banner();

    let result = match &commands.command {
        Commands::Setup(_) => setup::setup(&cfg).await,
        Commands::Verify {
            interface,
            protocol,
        } => verify::verify(interface, protocol.map(Into::into)),
        Commands::Interfaces => interfaces::interfaces(),
        Commands::Report => report::report(),
        Commands::Monitor { duration } => monitor::monitor(*duration).await,
    };

    let exit_code = match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Critical failure: {e:#}");
            ExitCode::FAILURE
        }
    };

    Print::end_of_program();

    exit_code
}
