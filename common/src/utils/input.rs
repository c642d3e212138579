// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Operator input for the timed prompts.
//!
//! Reading a terminal line blocks, so [`StdinInput`] does it on a dedicated
//! thread and forwards complete lines through a channel. The prompt awaits the
//! channel, which makes the read cancellable from the async side even though
//! the thread itself stays parked in `read_line` until the next newline.
//!
//! `read_line` retries interrupted reads on its own, so Ctrl-C is caught as a
//! signal on the async side and raced against the channel.

use std::future::Future;
use std::io::{self, BufRead};
use std::thread;

use async_trait::async_trait;
use tokio::sync::mpsc;

/// What arrived from the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A complete line, without its trailing newline.
    Line(String),
    /// The input stream is closed; no further lines will arrive.
    Closed,
    /// The operator asked to abort the selection.
    Interrupted,
}

/// A source of operator lines.
#[async_trait]
pub trait InputSource: Send {
    /// Waits for the next event. Must be cancel safe: dropping the future before
    /// it resolves must not lose a line.
    async fn next_event(&mut self) -> InputEvent;

    /// Drops whatever arrived while nobody was asking.
    fn discard_pending(&mut self) {}
}

/// Lines typed on the process's standard input.
pub struct StdinInput {
    rx: mpsc::UnboundedReceiver<InputEvent>,
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

impl StdinInput {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self::spawn_reader(tx);
        Self::from_receiver(rx)
    }

    /// Input fed by an existing channel instead of the terminal.
    pub fn from_receiver(rx: mpsc::UnboundedReceiver<InputEvent>) -> Self {
        Self { rx }
    }

    fn spawn_reader(tx: mpsc::UnboundedSender<InputEvent>) {
        thread::spawn(move || {
            let stdin = io::stdin();
            let mut lock = stdin.lock();
            loop {
                let mut line = String::new();
                let event = match lock.read_line(&mut line) {
                    Ok(0) => InputEvent::Closed,
                    Ok(_) => InputEvent::Line(line.trim_end_matches(['\r', '\n']).to_string()),
                    Err(_) => InputEvent::Closed,
                };
                let done = event != InputEvent::Closed && tx.send(event.clone()).is_ok();
                if !done {
                    let _ = tx.send(InputEvent::Closed);
                    break;
                }
            }
        });
    }
}

/// Next event from `rx`, or `Interrupted` once `interrupt` fires. Queued lines win.
async fn next_or_interrupt<F>(
    rx: &mut mpsc::UnboundedReceiver<InputEvent>,
    interrupt: F,
) -> InputEvent
where
    F: Future<Output = io::Result<()>>,
{
    let signalled = tokio::select! {
        biased;
        event = rx.recv() => return event.unwrap_or(InputEvent::Closed),
        signal = interrupt => signal.is_ok(),
    };
    if signalled {
        return InputEvent::Interrupted;
    }
    // no handler could be installed, keep waiting for input alone
    rx.recv().await.unwrap_or(InputEvent::Closed)
}

#[async_trait]
impl InputSource for StdinInput {
    async fn next_event(&mut self) -> InputEvent {
        next_or_interrupt(&mut self.rx, tokio::signal::ctrl_c()).await
    }

    fn discard_pending(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            if event == InputEvent::Closed {
                break;
            }
        }
    }
}

/// Replays a fixed list of events, each after a delay measured from the previous one.
/// Once exhausted it never resolves again, like an operator who walked away.
pub struct ScriptedInput {
    script: std::collections::VecDeque<(std::time::Duration, InputEvent)>,
}

impl ScriptedInput {
    pub fn new(script: Vec<(std::time::Duration, InputEvent)>) -> Self {
        Self {
            script: script.into(),
        }
    }

    /// Operator who never types anything.
    pub fn silent() -> Self {
        Self::new(Vec::new())
    }

    pub fn lines(lines: &[(u64, &str)]) -> Self {
        Self::new(
            lines
                .iter()
                .map(|(secs, line)| {
                    (
                        std::time::Duration::from_secs(*secs),
                        InputEvent::Line(line.to_string()),
                    )
                })
                .collect(),
        )
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn next_event(&mut self) -> InputEvent {
        let Some((delay, _)) = self.script.front() else {
            return std::future::pending().await;
        };
        tokio::time::sleep(*delay).await;
        match self.script.pop_front() {
            Some((_, event)) => event,
            None => std::future::pending().await,
        }
    }
}
