use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};

use super::{Scheduler, SchedulerError, TimerCallback, TimerHandle};

/// Scheduler backed by timer sources on a `calloop` event loop.
///
/// Each scheduled callback becomes a one-shot [`Timer`] source. Cancelling
/// removes the source from the loop, so a cancelled callback can never be
/// dispatched afterwards.
pub struct LoopScheduler<'l, Data> {
    handle: LoopHandle<'l, Data>,
    next_id: Cell<u64>,
    tokens: Rc<RefCell<HashMap<u64, RegistrationToken>>>,
}

impl<'l, Data> LoopScheduler<'l, Data> {
    pub fn new(handle: LoopHandle<'l, Data>) -> Self {
        Self {
            handle,
            next_id: Cell::new(0),
            tokens: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Number of timers registered and not yet fired or cancelled
    pub fn pending(&self) -> usize {
        self.tokens.borrow().len()
    }
}

impl<'l, Data> Scheduler for LoopScheduler<'l, Data> {
    fn schedule_after(
        &self,
        delay: Duration,
        callback: TimerCallback,
    ) -> Result<TimerHandle, SchedulerError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let tokens = self.tokens.clone();
        let mut callback = Some(callback);
        let token = self
            .handle
            .insert_source(Timer::from_duration(delay), move |_, _, _| {
                tokens.borrow_mut().remove(&id);
                if let Some(callback) = callback.take() {
                    callback();
                }
                TimeoutAction::Drop
            })
            .map_err(|e| SchedulerError::Register(e.error))?;

        self.tokens.borrow_mut().insert(id, token);
        log::trace!("Registered timer {} ({:?})", id, delay);
        Ok(TimerHandle::new(id))
    }

    fn cancel(&self, handle: TimerHandle) {
        let token = self.tokens.borrow_mut().remove(&handle.id());
        if let Some(token) = token {
            self.handle.remove(token);
            log::trace!("Removed timer {}", handle.id());
        }
    }
}
