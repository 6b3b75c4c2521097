//! Host scheduling boundary.
//!
//! A [`Typewriter`](crate::animation::Typewriter) never sleeps. Every tick is a
//! delayed callback handed to a [`Scheduler`], and every callback can be
//! cancelled through the [`TimerHandle`] returned when it was scheduled.
//!
//! Two schedulers ship with the crate:
//!
//! - [`ManualScheduler`] - simulated time, advanced explicitly by the host
//! - [`LoopScheduler`] - real timers registered on a `calloop` event loop

mod event_loop;
mod manual;

pub use event_loop::LoopScheduler;
pub use manual::ManualScheduler;

use std::time::Duration;

/// A delayed callback. Callbacks run on the thread that owns the scheduler.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Opaque handle identifying one scheduled callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The event loop refused to register the timer source
    #[error("failed to register timer: {0}")]
    Register(#[from] calloop::Error),
}

/// A single-threaded source of cancelable delayed callbacks.
///
/// Implementations must never run `callback` from inside `schedule_after`,
/// even for a zero delay. Cancelling a handle that already fired or was
/// already cancelled is a no-op.
pub trait Scheduler {
    fn schedule_after(
        &self,
        delay: Duration,
        callback: TimerCallback,
    ) -> Result<TimerHandle, SchedulerError>;

    fn cancel(&self, handle: TimerHandle);
}
