//! Debounced search input.
//!
//! Raw keystrokes update the visible search box immediately; the committed
//! term that actually triggers a fetch only settles after a quiet interval
//! with no further input. The controller is an explicit state machine with
//! an injected clock, so the event loop drives it with `Instant::now()` and
//! tests drive it with synthetic instants.
//!
//! States: Idle, or Pending(value, deadline). Any new input replaces a
//! pending commit and restarts the quiet period from the latest value, so
//! at most one commit happens per burst.

use std::time::{Duration, Instant};

/// Quiet interval with no further input before a raw value is committed.
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug)]
enum DebounceState {
    Idle,
    Pending { value: String, deadline: Instant },
}

#[derive(Debug)]
pub struct Debouncer {
    state: DebounceState,
    interval: Duration,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::with_interval(DEBOUNCE_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            state: DebounceState::Idle,
            interval,
        }
    }

    /// Record a raw input value, cancelling any pending commit and starting
    /// a new quiet period from `now`.
    pub fn record(&mut self, value: impl Into<String>, now: Instant) {
        self.state = DebounceState::Pending {
            value: value.into(),
            deadline: now + self.interval,
        };
    }

    /// Emit the pending value once its deadline has passed.
    ///
    /// Returns `Some(value)` exactly once per quiet period; the machine
    /// returns to Idle on emission.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.state {
            DebounceState::Pending { deadline, .. } if now >= *deadline => {}
            _ => return None,
        }
        match std::mem::replace(&mut self.state, DebounceState::Idle) {
            DebounceState::Pending { value, .. } => Some(value),
            DebounceState::Idle => None,
        }
    }

    /// Drop any pending commit without emitting it.
    pub fn cancel(&mut self) {
        self.state = DebounceState::Idle;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
