// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Command Line Interface Definitions
//!
//! The schema for user input. Execution lives in one submodule per command;
//! the arguments, flags and help text are defined here.
//!
//! * [`CommandLine`]: global flags for the whole process (logging, styling).
//! * [`Commands`]: the operation to run.
//!
//! `From<&CommandLine> for Config` turns flags into the engine's [`Config`] so
//! the core crates never see `clap` types.

pub mod interfaces;
pub mod monitor;
pub mod report;
pub mod setup;
pub mod verify;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use sambind_common::config::{self, Config};
use sambind_common::models::protocol::ProtocolVersion;

#[derive(Parser)]
#[command(name = "sambind")]
#[command(about = "Provision an anonymous SMB share bound to one interface, firewall included.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Keep logs and colors but hide the ASCII art
    #[arg(long = "no-banner", global = true)]
    pub no_banner: bool,

    /// Reduce UI visual density (-q: no hints or headers, -qq: log lines only)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Increase logging detail (-v: debug logs, -vv: every external command)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install, bind, start and open the firewall for the share
    #[command(alias = "s")]
    Setup(SetupArgs),

    /// Re-check a running setup without changing anything
    Verify {
        /// Interface the daemon is supposed to be bound to
        #[arg(short = 'i', long = "interface", value_name = "IFACE")]
        interface: String,

        /// Protocol range the configuration is expected to negotiate
        #[arg(short = 'p', long = "protocol", value_enum)]
        protocol: Option<ProtocolArg>,
    },

    /// List interfaces, the firewall backend and current SMB listeners
    #[command(alias = "i")]
    Interfaces,

    /// Write a diagnostic report to /tmp
    Report,

    /// Follow the daemon log for a while
    Monitor {
        /// Seconds to follow the log
        #[arg(short = 'd', long = "duration", default_value_t = 60)]
        duration: u64,
    },
}

#[derive(Args, Clone)]
pub struct SetupArgs {
    /// Take option 0 for every prompt without waiting
    #[arg(short = 'y', long = "unattended")]
    pub unattended: bool,

    /// Directory to export
    #[arg(long = "share-path", value_name = "PATH", default_value = config::DEFAULT_SHARE_PATH)]
    pub share_path: PathBuf,

    /// Name of the exported share
    #[arg(long = "share-name", value_name = "NAME", default_value = config::DEFAULT_SHARE_NAME)]
    pub share_name: String,

    /// Seconds each prompt waits before taking the default
    #[arg(short = 't', long = "timeout", value_name = "SECS", default_value_t = 60)]
    pub timeout: u64,

    /// Fail when no firewall backend is found instead of skipping it
    #[arg(long = "require-firewall")]
    pub require_firewall: bool,

    /// Enable verbose daemon logging
    #[arg(long = "debug")]
    pub debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ProtocolArg {
    /// SMBv1 through SMBv3
    MinCompat,
    /// SMBv2 through SMBv3
    Balanced,
    /// SMBv3 only
    SecureOnly,
}

impl From<ProtocolArg> for ProtocolVersion {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::MinCompat => ProtocolVersion::MinCompat,
            ProtocolArg::Balanced => ProtocolVersion::Balanced,
            ProtocolArg::SecureOnly => ProtocolVersion::SecureOnly,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl From<&CommandLine> for Config {
    fn from(cmd: &CommandLine) -> Self {
        let mut cfg = Config {
            no_banner: cmd.no_banner,
            quiet: cmd.quiet,
            ..Config::default()
        };

        if let Commands::Setup(args) = &cmd.command {
            cfg.unattended = args.unattended;
            cfg.debug = args.debug;
            cfg.share_path = args.share_path.clone();
            cfg.share_name = args.share_name.clone();
            cfg.prompt_timeout = Duration::from_secs(args.timeout);
            cfg.require_firewall = args.require_firewall;
        }
        cfg
    }
}
