use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use super::{Scheduler, SchedulerError, TimerCallback, TimerHandle};

/// Simulated-time scheduler.
///
/// Nothing fires until the host calls [`advance`](Self::advance),
/// [`advance_to`](Self::advance_to) or [`fire_next`](Self::fire_next).
/// Callbacks due at the same instant fire in the order they were scheduled,
/// and callbacks scheduled while advancing fire within the same call if
/// their deadline is still inside the window. Deadlines saturate at
/// `Duration::MAX`, which is never reached by advancing. Simulated time
/// never moves backwards.
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    queue: RefCell<TimerQueue>,
    /// Set while a zero-delay callback runs
    in_zero_delay: Cell<bool>,
}

#[derive(Default)]
struct TimerQueue {
    /// Keyed by (deadline, id) so equal deadlines keep scheduling order
    entries: BTreeMap<(Duration, u64), Entry>,
    deadlines: HashMap<u64, Duration>,
}

struct Entry {
    callback: TimerCallback,
    zero_delay: bool,
    /// Zero-delay callback scheduled from inside another zero-delay callback
    chained: bool,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            next_id: Cell::new(0),
            queue: RefCell::new(TimerQueue::default()),
            in_zero_delay: Cell::new(false),
        }
    }

    /// Current simulated time, measured from creation
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of callbacks waiting to fire
    pub fn pending(&self) -> usize {
        self.queue.borrow().entries.len()
    }

    /// Deadline of the earliest pending callback
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue
            .borrow()
            .entries
            .keys()
            .next()
            .map(|(deadline, _)| *deadline)
    }

    /// Move simulated time forward by `by`, firing every callback that falls due.
    /// Returns how many callbacks fired.
    ///
    /// A zero-delay callback scheduled by another zero-delay callback during
    /// the call is left for the next call, so a chain of them cannot keep
    /// this from returning. Step through such chains with
    /// [`fire_next`](Self::fire_next).
    pub fn advance(&self, by: Duration) -> usize {
        self.advance_to(self.now.get().saturating_add(by))
    }

    /// Move simulated time forward to `target`. Targets in the past are ignored.
    pub fn advance_to(&self, target: Duration) -> usize {
        // Stop short of MAX, the deadline of callbacks that never fire
        let target = target.min(Duration::MAX - Duration::from_nanos(1));
        let first_new_id = self.next_id.get();
        let mut fired = 0;
        // The queue borrow is released before each callback runs so the
        // callback can schedule or cancel.
        while let Some((deadline, entry)) = self.pop_due(target, Some(first_new_id)) {
            self.run(deadline, entry);
            fired += 1;
        }
        if target > self.now.get() {
            self.now.set(target);
        }
        fired
    }

    /// Jump to the earliest pending deadline and fire that one callback.
    /// Returns false if nothing was pending.
    pub fn fire_next(&self) -> bool {
        let Some(deadline) = self.next_deadline() else {
            return false;
        };
        let Some((deadline, entry)) = self.pop_due(deadline, None) else {
            return false;
        };
        self.run(deadline, entry);
        true
    }

    fn run(&self, deadline: Duration, entry: Entry) {
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
        let outer = self.in_zero_delay.replace(entry.zero_delay);
        (entry.callback)();
        self.in_zero_delay.set(outer);
    }

    /// Remove the earliest callback due by `target`. Chained callbacks with
    /// an id at or above `deferred_from` are skipped.
    fn pop_due(&self, target: Duration, deferred_from: Option<u64>) -> Option<(Duration, Entry)> {
        let mut queue = self.queue.borrow_mut();
        let key = queue
            .entries
            .range(..=(target, u64::MAX))
            .find(|((_, id), entry)| {
                !(entry.chained && deferred_from.is_some_and(|first| *id >= first))
            })
            .map(|(key, _)| *key)?;
        let entry = queue.entries.remove(&key)?;
        queue.deadlines.remove(&key.1);
        Some((key.0, entry))
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(
        &self,
        delay: Duration,
        callback: TimerCallback,
    ) -> Result<TimerHandle, SchedulerError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let deadline = self.now.get().saturating_add(delay);
        let mut queue = self.queue.borrow_mut();
        queue.entries.insert(
            (deadline, id),
            Entry {
                callback,
                zero_delay: delay.is_zero(),
                chained: delay.is_zero() && self.in_zero_delay.get(),
            },
        );
        queue.deadlines.insert(id, deadline);

        Ok(TimerHandle::new(id))
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut queue = self.queue.borrow_mut();
        if let Some(deadline) = queue.deadlines.remove(&handle.id()) {
            queue.entries.remove(&(deadline, handle.id()));
        }
    }
}
