//! Countdown used by timed (live session) questions.
//!
//! When the countdown reaches zero the current selection is submitted
//! automatically. The countdown reports expiry exactly once so the caller
//! never double-submits. Between requests the countdown lives in the
//! learner's progress row as a start time plus an "already expired" marker;
//! [`Countdown::resume`] rebuilds it from those.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Result of advancing the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Running { remaining_secs: u32 },
    /// Reached zero on this tick. Submit now.
    Expired,
    /// Already expired on an earlier tick.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub duration_secs: u32,
    pub elapsed_secs: u32,
    pub expired: bool,
}

impl Countdown {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            elapsed_secs: 0,
            expired: false,
        }
    }

    /// Countdown restored from storage. `already_expired` records an expiry
    /// handled on an earlier request.
    pub fn resume(duration_secs: u32, already_expired: bool) -> Self {
        Self {
            expired: already_expired,
            ..Self::new(duration_secs)
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.duration_secs.saturating_sub(self.elapsed_secs)
    }

    /// Advance by `secs`.
    pub fn tick(&mut self, secs: u32) -> CountdownEvent {
        if self.expired {
            return CountdownEvent::Finished;
        }
        self.elapsed_secs = self.elapsed_secs.saturating_add(secs).min(self.duration_secs);
        if self.remaining_secs() == 0 {
            self.expired = true;
            CountdownEvent::Expired
        } else {
            CountdownEvent::Running {
                remaining_secs: self.remaining_secs(),
            }
        }
    }
}

/// Whole seconds from `started_at` to `now`. Clock skew counts as zero.
pub fn elapsed_secs(started_at: Timestamp, now: Timestamp) -> u32 {
    let secs = (now - started_at).num_seconds().max(0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}
