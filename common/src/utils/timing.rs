// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use tokio::time::Instant;

/// A fixed deadline shared by every re-issue of a prompt.
///
/// The deadline is set once at construction. Re-prompting after invalid input
/// reads from the same `Countdown`, so elapsed time only ever grows.
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    started: Instant,
    deadline: Instant,
}

impl Countdown {
    pub fn new(timeout: Duration) -> Self {
        let now = Instant::now();
        Self {
            started: now,
            deadline: now + timeout,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.started)
    }

    /// Time left, saturating at zero.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Remaining time rounded up to whole seconds, as shown to the operator.
    pub fn remaining_secs(&self) -> u64 {
        let rem = self.remaining();
        rem.as_secs() + u64::from(rem.subsec_nanos() > 0)
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}
