//! Deferred task scheduling
//!
//! This module provides:
//! - **Ticks**: the host's monotonic server tick counter
//! - **Active tasks**: runtime state of a scheduled callback (one-shot or repeating)
//! - **Scheduler**: tick-ordered queue the engine drains once per host tick
//!
//! Nothing here blocks. Every delay in the engine (round advance, wave
//! timeout, monitor ticks, HUD refresh, particle trails) is a task armed
//! relative to "now" and fired when the host reaches its tick.

mod active;
mod manager;

#[cfg(test)]
mod manager_tests;

pub use active::{ScheduledTask, TaskHandle, Tick};
pub use manager::{DueTask, Scheduler};
