//! Timer primitives driven by explicit elapsed time.
//!
//! Games never look at the wall clock. The caller passes the time that has
//! passed to `tick`, and these helpers turn it into countdown expiries,
//! stopwatch readings, delayed continuations and fixed physics steps. A
//! dropped or cancelled timer simply stops being ticked, so there is nothing
//! to clear on teardown.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a [`Countdown`] did during one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerStatus {
    /// Not running.
    Idle,
    /// Still counting down.
    Running,
    /// Reached zero during this tick. Reported exactly once.
    Expired,
}

/// Round timer counting down to zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: Duration,
    running: bool,
}

impl Countdown {
    /// A running countdown.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            remaining: duration,
            running: true,
        }
    }

    /// A countdown that is not running.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// (Re)start from `duration`.
    pub fn start(&mut self, duration: Duration) {
        self.remaining = duration;
        self.running = true;
    }

    /// Stop without expiring.
    pub fn cancel(&mut self) {
        self.running = false;
    }

    /// True while counting.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time left.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Whole seconds left, rounded up (what a countdown display shows).
    #[must_use]
    pub fn whole_seconds_left(&self) -> u64 {
        let millis = self.remaining.as_millis() as u64;
        millis.div_ceil(1000)
    }

    /// Advance by `dt`.
    pub fn tick(&mut self, dt: Duration) -> TimerStatus {
        if !self.running {
            return TimerStatus::Idle;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.running = false;
            TimerStatus::Expired
        } else {
            TimerStatus::Running
        }
    }
}

/// Elapsed-time counter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stopwatch {
    elapsed: Duration,
    running: bool,
}

impl Stopwatch {
    /// A stopped stopwatch at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to zero and start.
    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
        self.running = true;
    }

    /// Freeze the current reading.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// True while counting.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance by `dt` if running.
    pub fn tick(&mut self, dt: Duration) {
        if self.running {
            self.elapsed += dt;
        }
    }

    /// Time counted so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Reading truncated to tenths of a second, as displayed.
    #[must_use]
    pub fn seconds_tenths(&self) -> f64 {
        (self.elapsed.as_millis() / 100) as f64 / 10.0
    }
}

/// A continuation scheduled to run after some time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delay<T> {
    pending: Option<(Duration, T)>,
}

impl<T> Default for Delay<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Delay<T> {
    /// Nothing scheduled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `value` to fire after `after`, replacing anything pending.
    pub fn schedule(&mut self, after: Duration, value: T) {
        self.pending = Some((after, value));
    }

    /// Drop whatever is pending.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// True while something is scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The scheduled value, if any.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, value)| value)
    }

    /// Advance by `dt`; returns the value once its time has come.
    pub fn tick(&mut self, dt: Duration) -> Option<T> {
        let (remaining, _) = self.pending.as_mut()?;
        *remaining = remaining.saturating_sub(dt);
        if remaining.is_zero() {
            self.pending.take().map(|(_, value)| value)
        } else {
            None
        }
    }
}

/// Splits arbitrary elapsed time into whole fixed-size steps.
///
/// Mirrors an interval timer: a motion update that runs every 16 ms runs
/// three times for a 50 ms tick and carries the 2 ms remainder over.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedStep {
    step: Duration,
    carry: Duration,
}

impl FixedStep {
    /// Steps of `step` length. `step` must be non-zero.
    #[must_use]
    pub fn new(step: Duration) -> Self {
        assert!(!step.is_zero(), "step must be non-zero");
        Self {
            step,
            carry: Duration::ZERO,
        }
    }

    /// Length of one step.
    #[must_use]
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Number of whole steps covered by `dt` plus the carried remainder.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        let total = self.carry + dt;
        let steps = (total.as_nanos() / self.step.as_nanos()) as u32;
        self.carry = total - self.step * steps;
        steps
    }

    /// Forget the carried remainder.
    pub fn reset(&mut self) {
        self.carry = Duration::ZERO;
    }
}
