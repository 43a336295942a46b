//! Deferred single-threaded callbacks
//!
//! Tasks are kept in a min-heap keyed by fire time, then by insertion order
//! so that tasks due at the same moment run in the order they were
//! scheduled. Cancelled handles are skipped lazily when popped.

use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Handle used to cancel a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(pub u64);

#[derive(Debug)]
struct ScheduledTask<T> {
    fire_at: OrderedFloat<f32>,
    handle: TaskHandle,
    task: T,
}

impl<T> PartialEq for ScheduledTask<T> {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.handle == other.handle
    }
}

impl<T> Eq for ScheduledTask<T> {}

impl<T> PartialOrd for ScheduledTask<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ScheduledTask<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.handle.cmp(&self.handle))
    }
}

/// Priority queue of (fire time, task) pairs with cancellation
#[derive(Debug)]
pub struct TaskScheduler<T> {
    queue: BinaryHeap<ScheduledTask<T>>,
    cancelled: HashSet<TaskHandle>,
    next_handle: u64,
    now: f32,
}

impl<T> Default for TaskScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskScheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            cancelled: HashSet::new(),
            next_handle: 0,
            now: 0.0,
        }
    }

    /// Current scheduler time in seconds
    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn advance(&mut self, delta_secs: f32) {
        if delta_secs.is_finite() && delta_secs > 0.0 {
            self.now += delta_secs;
        }
    }

    /// Run `task` once `delay_secs` have elapsed; bad delays count as zero
    pub fn schedule(&mut self, delay_secs: f32, task: T) -> TaskHandle {
        let delay = if delay_secs.is_finite() { delay_secs.max(0.0) } else { 0.0 };
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.queue.push(ScheduledTask {
            fire_at: OrderedFloat(self.now + delay),
            handle,
            task,
        });
        handle
    }

    pub fn cancel(&mut self, handle: TaskHandle) {
        if self.queue.iter().any(|t| t.handle == handle) {
            self.cancelled.insert(handle);
        }
    }

    pub fn cancel_all(&mut self) {
        self.queue.clear();
        self.cancelled.clear();
    }

    /// Pop the next task due at or before the current time
    pub fn pop_due(&mut self) -> Option<T> {
        while let Some(next) = self.queue.peek() {
            if next.fire_at.0 > self.now {
                return None;
            }
            let scheduled = self.queue.pop()?;
            if self.cancelled.remove(&scheduled.handle) {
                continue;
            }
            return Some(scheduled.task);
        }
        None
    }

    /// Number of live (not cancelled) tasks
    pub fn pending(&self) -> usize {
        self.queue.len() - self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Drop all tasks and restart the time base
    pub fn reset(&mut self) {
        self.cancel_all();
        self.now = 0.0;
    }
}
