//! Tests for the tick scheduler
//!
//! Verifies ordering, repeats and cancellation.

use super::{Scheduler, Tick};

#[derive(Debug, Clone, PartialEq)]
enum Job {
    Advance,
    Timeout,
    Pulse,
}

fn drain(scheduler: &mut Scheduler<Job>, now: Tick) -> Vec<Job> {
    let mut fired = Vec::new();
    while let Some(due) = scheduler.pop_due(now) {
        fired.push(due.payload);
    }
    fired
}

#[test]
fn test_once_fires_at_its_tick() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule_once(Tick(0), Tick(100), Job::Advance);

    assert!(drain(&mut scheduler, Tick(99)).is_empty());
    assert_eq!(drain(&mut scheduler, Tick(100)), vec![Job::Advance]);
    assert!(scheduler.is_empty(), "one-shot should be gone after firing");
}

#[test]
fn test_same_tick_keeps_arming_order() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule_once(Tick(0), Tick(20), Job::Timeout);
    scheduler.schedule_once(Tick(0), Tick(20), Job::Advance);
    scheduler.schedule_once(Tick(0), Tick(10), Job::Pulse);

    assert_eq!(
        drain(&mut scheduler, Tick(20)),
        vec![Job::Pulse, Job::Timeout, Job::Advance]
    );
}

#[test]
fn test_repeating_respects_run_budget() {
    let mut scheduler = Scheduler::new();
    let handle = scheduler.schedule_repeating(Tick(0), Tick(2), 2, Some(3), Job::Pulse);

    let mut runs = Vec::new();
    for t in 0..=20 {
        while let Some(due) = scheduler.pop_due(Tick(t)) {
            runs.push((t, due.run));
        }
    }

    assert_eq!(runs, vec![(2, 1), (4, 2), (6, 3)]);
    assert!(!scheduler.is_scheduled(handle));
}

#[test]
fn test_unbounded_repeat_until_cancelled() {
    let mut scheduler = Scheduler::new();
    let handle = scheduler.schedule_repeating(Tick(0), Tick(20), 20, None, Job::Pulse);

    assert_eq!(drain(&mut scheduler, Tick(20)).len(), 1);
    assert_eq!(drain(&mut scheduler, Tick(40)).len(), 1);
    assert_eq!(scheduler.next_due(), Some(Tick(60)));

    assert!(scheduler.cancel(handle));
    assert!(drain(&mut scheduler, Tick(1000)).is_empty());
    assert!(!scheduler.cancel(handle), "second cancel is a no-op");
}

#[test]
fn test_late_drain_catches_up_each_period() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule_repeating(Tick(0), Tick(20), 20, Some(5), Job::Pulse);

    // A stalled host that jumps straight to tick 70 still sees every firing due so far
    let fired = drain(&mut scheduler, Tick(70));
    assert_eq!(fired.len(), 3);
    assert_eq!(scheduler.next_due(), Some(Tick(80)));
}

#[test]
fn test_cancel_one_of_two() {
    let mut scheduler = Scheduler::new();
    let timeout = scheduler.schedule_once(Tick(0), Tick(50), Job::Timeout);
    scheduler.schedule_once(Tick(0), Tick(50), Job::Advance);

    scheduler.cancel(timeout);
    assert_eq!(drain(&mut scheduler, Tick(50)), vec![Job::Advance]);
}

#[test]
fn test_tick_conversions() {
    assert_eq!(Tick::from_secs(5), Tick(100));
    assert_eq!(Tick(100).as_millis(), 5000);
    assert_eq!(Tick(10).since(Tick(30)), 0);
    assert_eq!(Tick(30).since(Tick(10)), 20);
}
