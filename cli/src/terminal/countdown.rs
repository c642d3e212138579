// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Terminal side of the timed prompt.
//!
//! Options are printed once through the regular output path. The countdown is
//! a single line redrawn in place with `crossterm`, so it never scrolls the
//! option list away.

use std::io::{self, Write};

use colored::*;
use crossterm::{
    cursor::MoveToColumn,
    execute,
    style::Print as Emit,
    terminal::{Clear, ClearType},
};

use sambind_common::error::InvalidSelectionInput;
use sambind_core::prompt::{OptionView, PromptDisplay, Resolution};

use crate::sprint;
use crate::terminal::{colors, print::Print};

/// Seconds below which the countdown turns red.
const LOW_SECS: u64 = 10;

pub struct TerminalCountdown;

impl TerminalCountdown {
    fn redraw(text: &str) {
        let mut err = io::stderr();
        let _ = execute!(
            err,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Emit(text)
        );
        let _ = err.flush();
    }
}

pub fn countdown_line(remaining_secs: u64, max_index: usize) -> String {
    let color = if remaining_secs <= LOW_SECS {
        colors::COUNTDOWN_LOW
    } else {
        colors::COUNTDOWN
    };
    format!(
        "{} Choose 0-{} [default 0] {} ",
        "?".color(colors::SECONDARY).bold(),
        max_index,
        format!("({remaining_secs}s)").color(color)
    )
}

impl PromptDisplay for TerminalCountdown {
    fn present(&self, title: &str, options: &[OptionView]) {
        Print::header(title);
        let show_hints = Print::quiet_level() == 0;
        for option in options {
            let default = if option.index == 0 {
                " (default)".color(colors::SEPARATOR)
            } else {
                "".normal()
            };
            sprint!(
                "{} {}{}",
                format!("[{}]", option.index.to_string().color(colors::ACCENT))
                    .color(colors::SEPARATOR),
                option.label.color(colors::PRIMARY),
                default
            );
            if show_hints {
                for hint in &option.hints {
                    sprint!("     {}", hint.color(colors::TEXT_DEFAULT).italic());
                }
            }
        }
    }

    fn tick(&self, remaining_secs: u64, max_index: usize) {
        Self::redraw(&countdown_line(remaining_secs, max_index));
    }

    fn rejected(&self, _error: &InvalidSelectionInput) {
        // the warning is already logged; start the countdown on a fresh line
        Self::redraw("");
    }

    fn resolved(&self, label: &str, resolution: Resolution) {
        Self::redraw("");
        let how = match resolution {
            Resolution::Chosen => "selected",
            Resolution::TimedOut => "timed out, using default",
            Resolution::InputClosed => "no input, using default",
            Resolution::Interrupted => "interrupted, using default",
            Resolution::Unattended => "unattended",
        };
        sprint!(
            "{} {} {}",
            ">".color(colors::SEPARATOR),
            label.color(colors::PRIMARY).bold(),
            format!("({how})").color(colors::SEPARATOR)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_line_names_range_and_time() {
        colored::control::set_override(false);
        let line = countdown_line(42, 3);
        assert!(line.contains("Choose 0-3 [default 0]"));
        assert!(line.contains("(42s)"));
    }
}
