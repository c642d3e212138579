// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Timed Selection Prompt
//!
//! Offers a numbered list of options and waits for the operator until a single
//! fixed deadline. Whatever happens first wins:
//!
//! * a valid index is typed: that option is returned immediately,
//! * the deadline passes: option 0 is returned,
//! * the input stream closes or is interrupted: option 0 is returned.
//!
//! Invalid lines are rejected and the operator is asked again, but the deadline
//! is never pushed back. A countdown task redraws the remaining time once per
//! tick and is aborted as soon as the prompt resolves.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use sambind_common::error::InvalidSelectionInput;
use sambind_common::models::selection::SelectionList;
use sambind_common::utils::input::{InputEvent, InputSource};
use sambind_common::utils::timing::Countdown;
use sambind_common::{debug, warn};

/// Redraw cadence of the countdown.
pub const TICK: Duration = Duration::from_secs(1);

/// How a prompt came to its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Chosen,
    TimedOut,
    InputClosed,
    Interrupted,
    Unattended,
}

impl Resolution {
    pub fn used_default(self) -> bool {
        self != Resolution::Chosen
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<T> {
    pub index: usize,
    pub value: T,
    pub resolution: Resolution,
}

/// An option as the display needs it, stripped of its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub index: usize,
    pub label: String,
    pub hints: Vec<String>,
}

/// Where the prompt renders itself. Implemented by the terminal in the CLI and
/// by recorders in tests.
pub trait PromptDisplay: Send + Sync {
    /// Lists the options once, before the countdown starts.
    fn present(&self, title: &str, options: &[OptionView]);

    /// Called once per tick with the whole seconds left.
    fn tick(&self, remaining_secs: u64, max_index: usize);

    fn rejected(&self, error: &InvalidSelectionInput);

    fn resolved(&self, label: &str, resolution: Resolution);
}

/// Parses one operator line into an option index.
pub fn parse_choice(line: &str, max_index: usize) -> Result<usize, InvalidSelectionInput> {
    let trimmed = line.trim();
    let index: usize = trimmed
        .parse()
        .map_err(|_| InvalidSelectionInput::NotNumeric(trimmed.to_string()))?;
    if index > max_index {
        return Err(InvalidSelectionInput::OutOfRange {
            index,
            max: max_index,
        });
    }
    Ok(index)
}

/// Keeps the countdown redraw alive for as long as it is held.
struct CountdownGuard {
    handle: JoinHandle<()>,
}

impl CountdownGuard {
    fn start(display: Arc<dyn PromptDisplay>, countdown: Countdown, max_index: usize) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            loop {
                interval.tick().await;
                let remaining = countdown.remaining_secs();
                display.tick(remaining, max_index);
                if remaining == 0 {
                    break;
                }
            }
        });
        Self { handle }
    }
}

impl Drop for CountdownGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct TimedPrompt {
    input: Box<dyn InputSource>,
    display: Arc<dyn PromptDisplay>,
    timeout: Duration,
}

impl TimedPrompt {
    pub fn new(
        input: Box<dyn InputSource>,
        display: Arc<dyn PromptDisplay>,
        timeout: Duration,
    ) -> Self {
        Self {
            input,
            display,
            timeout,
        }
    }

    /// Asks the operator to pick one of `options`. Never fails: every path that
    /// does not produce a valid choice falls back to option 0.
    pub async fn select<T: Clone>(&mut self, title: &str, options: &SelectionList<T>) -> Selection<T> {
        let views: Vec<OptionView> = options
            .iter()
            .map(|o| OptionView {
                index: o.index,
                label: o.label.clone(),
                hints: o.hints.clone(),
            })
            .collect();
        self.input.discard_pending();
        self.display.present(title, &views);

        let max_index = options.max_index();
        let countdown = Countdown::new(self.timeout);
        let ticker = CountdownGuard::start(self.display.clone(), countdown, max_index);

        let selection = loop {
            tokio::select! {
                biased;
                event = self.input.next_event() => match event {
                    InputEvent::Line(line) if line.trim().is_empty() => continue,
                    InputEvent::Line(line) => match parse_choice(&line, max_index) {
                        Ok(index) => break pick(options, index, Resolution::Chosen),
                        Err(e) => {
                            warn!("Invalid choice: {e}");
                            self.display.rejected(&e);
                        }
                    },
                    InputEvent::Closed => break default_of(options, Resolution::InputClosed),
                    InputEvent::Interrupted => break default_of(options, Resolution::Interrupted),
                },
                _ = tokio::time::sleep_until(countdown.deadline()) => {
                    break default_of(options, Resolution::TimedOut);
                }
            }
        };
        drop(ticker);

        debug!(
            verbosity = 2,
            "'{title}' resolved to option {} ({:?}) after {:?}",
            selection.index,
            selection.resolution,
            countdown.elapsed()
        );
        let label = &views[selection.index].label;
        self.display.resolved(label, selection.resolution);
        selection
    }
}

/// The answer an unattended run gives to every prompt.
pub fn unattended<T: Clone>(options: &SelectionList<T>) -> Selection<T> {
    default_of(options, Resolution::Unattended)
}

fn default_of<T: Clone>(options: &SelectionList<T>, resolution: Resolution) -> Selection<T> {
    let opt = options.default_option();
    Selection {
        index: opt.index,
        value: opt.value.clone(),
        resolution,
    }
}

fn pick<T: Clone>(options: &SelectionList<T>, index: usize, resolution: Resolution) -> Selection<T> {
    match options.get(index) {
        Some(opt) => Selection {
            index,
            value: opt.value.clone(),
            resolution,
        },
        None => default_of(options, Resolution::TimedOut),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
