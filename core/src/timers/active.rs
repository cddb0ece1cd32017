//! Scheduled task instances (runtime state)
//!
//! A `ScheduledTask` is a callback payload waiting for a tick. Repeating
//! tasks re-arm themselves `period` ticks after each firing until their run
//! budget is spent.
//!
//! # Lifecycle
//!
//! 1. Scheduled → queued under `(fires_at, sequence)`
//! 2. Host tick reaches `fires_at` → payload handed to the engine
//! 3. One-shot or budget spent → removed; otherwise re-queued

use std::fmt;

use curse_types::TICKS_PER_SECOND;

/// Host server tick. 20 ticks per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    pub fn from_secs(secs: u64) -> Self {
        Tick(secs * TICKS_PER_SECOND)
    }

    /// The tick `ticks` after this one.
    pub fn after(self, ticks: u64) -> Tick {
        Tick(self.0.saturating_add(ticks))
    }

    /// Ticks elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn as_millis(self) -> u64 {
        self.0 * 1000 / TICKS_PER_SECOND
    }

    pub fn as_secs(self) -> u64 {
        self.0 / TICKS_PER_SECOND
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Identifies one scheduled task for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(pub(crate) u64);

/// A queued task
#[derive(Debug, Clone)]
pub struct ScheduledTask<T> {
    pub handle: TaskHandle,

    pub payload: T,

    // ─── Timing ─────────────────────────────────────────────────────────────
    /// When the task was armed
    pub scheduled_at: Tick,

    /// Next tick this task fires on
    pub fires_at: Tick,

    /// Re-arm period for repeating tasks
    pub period: Option<u64>,

    // ─── Repeats ────────────────────────────────────────────────────────────
    /// How many times this task has fired
    pub run_count: u32,

    /// Total firings allowed (`None` = until cancelled)
    pub max_runs: Option<u32>,
}

impl<T> ScheduledTask<T> {
    pub fn once(handle: TaskHandle, payload: T, now: Tick, fires_at: Tick) -> Self {
        Self {
            handle,
            payload,
            scheduled_at: now,
            fires_at,
            period: None,
            run_count: 0,
            max_runs: Some(1),
        }
    }

    pub fn repeating(
        handle: TaskHandle,
        payload: T,
        now: Tick,
        first_at: Tick,
        period: u64,
        max_runs: Option<u32>,
    ) -> Self {
        Self {
            handle,
            payload,
            scheduled_at: now,
            fires_at: first_at,
            period: Some(period.max(1)),
            run_count: 0,
            max_runs,
        }
    }

    pub fn is_due(&self, now: Tick) -> bool {
        now >= self.fires_at
    }

    /// Record a firing. Returns true if the task should be re-queued.
    pub fn fire(&mut self) -> bool {
        self.run_count += 1;
        let Some(period) = self.period else {
            return false;
        };
        if self.max_runs.is_some_and(|max| self.run_count >= max) {
            return false;
        }
        self.fires_at = self.fires_at.after(period);
        true
    }

    /// Ticks left until the next firing
    pub fn remaining_ticks(&self, now: Tick) -> u64 {
        self.fires_at.since(now)
    }
}
