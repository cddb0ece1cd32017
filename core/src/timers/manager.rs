use std::collections::BTreeMap;

use hashbrown::HashMap;

use super::{ScheduledTask, TaskHandle, Tick};

/// A task handed back to the engine because its tick arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct DueTask<T> {
    pub handle: TaskHandle,
    pub payload: T,
    /// Tick the task was due on (may be earlier than "now" after a stall)
    pub due_at: Tick,
    /// 1-based firing count
    pub run: u32,
}

/// Tick-ordered task queue.
///
/// Tasks due on the same tick come out in the order they were armed.
#[derive(Debug)]
pub struct Scheduler<T> {
    tasks: HashMap<TaskHandle, ScheduledTask<T>>,
    queue: BTreeMap<(Tick, u64), TaskHandle>,
    next_handle: u64,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            tasks: HashMap::new(),
            queue: BTreeMap::new(),
            next_handle: 1,
            next_seq: 0,
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, now: Tick, at: Tick, payload: T) -> TaskHandle {
        let handle = self.allocate();
        let task = ScheduledTask::once(handle, payload, now, at);
        self.enqueue(task);
        handle
    }

    pub fn schedule_repeating(
        &mut self,
        now: Tick,
        first_at: Tick,
        period: u64,
        max_runs: Option<u32>,
        payload: T,
    ) -> TaskHandle {
        let handle = self.allocate();
        let task = ScheduledTask::repeating(handle, payload, now, first_at, period, max_runs);
        self.enqueue(task);
        handle
    }

    /// Cancel a task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let Some(task) = self.tasks.remove(&handle) else {
            return false;
        };
        self.queue.retain(|(tick, _), h| !(*tick == task.fires_at && *h == handle));
        true
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.contains_key(&handle)
    }

    pub fn get(&self, handle: TaskHandle) -> Option<&ScheduledTask<T>> {
        self.tasks.get(&handle)
    }

    /// Take the earliest task due at or before `now`.
    ///
    /// Repeating tasks are re-armed before being returned, so cancelling
    /// the handle from inside the dispatch stops further runs.
    pub fn pop_due(&mut self, now: Tick) -> Option<DueTask<T>> {
        let (&(tick, seq), _) = self.queue.first_key_value()?;
        if tick > now {
            return None;
        }
        let handle = self.queue.remove(&(tick, seq))?;
        let task = self.tasks.get_mut(&handle)?;
        let due_at = task.fires_at;
        let rearm = task.fire();
        let due = DueTask {
            handle,
            payload: task.payload.clone(),
            due_at,
            run: task.run_count,
        };

        if rearm {
            let fires_at = task.fires_at;
            let seq = self.bump_seq();
            self.queue.insert((fires_at, seq), handle);
        } else {
            self.tasks.remove(&handle);
        }
        Some(due)
    }

    pub fn next_due(&self) -> Option<Tick> {
        self.queue.first_key_value().map(|((tick, _), _)| *tick)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.queue.clear();
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    fn allocate(&mut self) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn enqueue(&mut self, task: ScheduledTask<T>) {
        let seq = self.bump_seq();
        self.queue.insert((task.fires_at, seq), task.handle);
        self.tasks.insert(task.handle, task);
    }
}
