//! Self-driving typewriter animation.
//!
//! A [`Typewriter`] types its text one character at a time, holds it, deletes it
//! one character at a time, waits briefly and starts over, forever. Each step
//! is one delayed callback on the host's [`Scheduler`]; at most one callback is
//! pending per instance and it is cancelled before any replacement is scheduled.
//!
//! ```ignore
//! let scheduler = Rc::new(ManualScheduler::new());
//! let typewriter = Typewriter::new(AnimationConfig::new("Hi"), scheduler.clone());
//!
//! scheduler.advance(Duration::from_millis(100));
//! assert_eq!(typewriter.display_text(), "H");
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::config::AnimationConfig;
use super::state::{visible_prefix, AnimationState, Phase};
use crate::scheduler::{Scheduler, TimerHandle};

/// What the host sees after a state change
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub phase: Phase,
    pub cursor: usize,
    pub text: String,
}

type Observer = Box<dyn FnMut(&Snapshot)>;

struct Core {
    config: AnimationConfig,
    /// Character length of `config.text`
    len: usize,
    state: AnimationState,
    pending: Option<TimerHandle>,
    active: bool,
    /// Bumped on every reschedule; a callback only acts if its generation matches
    generation: u64,
}

impl Core {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.state.phase(),
            cursor: self.state.cursor(),
            text: visible_prefix(&self.config.text, self.state.cursor()).to_string(),
        }
    }
}

struct Shared<S> {
    core: RefCell<Core>,
    observers: RefCell<Vec<Observer>>,
    scheduler: Rc<S>,
}

/// A looping type-then-delete text animation.
///
/// Dropping the typewriter destroys it.
pub struct Typewriter<S: Scheduler + 'static> {
    shared: Rc<Shared<S>>,
}

impl<S: Scheduler + 'static> Typewriter<S> {
    /// Create a typewriter and schedule its first tick.
    ///
    /// Any text and any delays are accepted. An empty text never shows
    /// anything and cycles through the pause phases.
    pub fn new(config: AnimationConfig, scheduler: Rc<S>) -> Self {
        let len = config.char_len();
        log::debug!(
            "Creating typewriter for {} chars (typing {:?}, deleting {:?}, loop {:?})",
            len,
            config.typing_delay,
            config.deleting_delay,
            config.loop_delay
        );

        let shared = Rc::new(Shared {
            core: RefCell::new(Core {
                config,
                len,
                state: AnimationState::new(),
                pending: None,
                active: true,
                generation: 0,
            }),
            observers: RefCell::new(Vec::new()),
            scheduler,
        });

        {
            let mut core = shared.core.borrow_mut();
            core.state.resolve(len);
            schedule_next(&shared, &mut core);
        }

        Self { shared }
    }

    /// The currently displayed prefix of the text
    pub fn display_text(&self) -> String {
        let core = self.shared.core.borrow();
        visible_prefix(&core.config.text, core.state.cursor()).to_string()
    }

    pub fn phase(&self) -> Phase {
        self.shared.core.borrow().state.phase()
    }

    /// Number of characters currently displayed
    pub fn cursor(&self) -> usize {
        self.shared.core.borrow().state.cursor()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.core.borrow().snapshot()
    }

    pub fn config(&self) -> AnimationConfig {
        self.shared.core.borrow().config.clone()
    }

    /// False once [`destroy`](Self::destroy) has been called
    pub fn is_active(&self) -> bool {
        self.shared.core.borrow().active
    }

    /// Whether a tick is scheduled
    pub fn has_pending_tick(&self) -> bool {
        self.shared.core.borrow().pending.is_some()
    }

    /// Register an observer called after every state change, including
    /// phases that complete without a tick.
    ///
    /// Observers may read, reset or destroy the typewriter. Changes they make
    /// are not reported back to observers while a notification is running.
    ///
    /// # Panics
    /// Panics if called from inside an observer.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: FnMut(&Snapshot) + 'static,
    {
        self.shared.observers.borrow_mut().push(Box::new(observer));
    }

    /// Restart from an empty display, typing next.
    pub fn reset(&self) {
        let events = {
            let mut core = self.shared.core.borrow_mut();
            if !core.active {
                return;
            }
            log::debug!("Resetting typewriter");
            restart(&self.shared, &mut core)
        };
        notify(&self.shared, &events);
    }

    /// Replace the configuration. An identical configuration changes nothing;
    /// anything else restarts the animation.
    pub fn set_config(&self, config: AnimationConfig) {
        let events = {
            let mut core = self.shared.core.borrow_mut();
            if !core.active || core.config == config {
                return;
            }
            log::debug!("Typewriter configuration changed, restarting");
            core.len = config.char_len();
            core.config = config;
            restart(&self.shared, &mut core)
        };
        notify(&self.shared, &events);
    }

    /// Replace only the text
    pub fn set_text(&self, text: impl Into<String>) {
        let config = self.config().text(text);
        self.set_config(config);
    }

    /// Cancel the pending tick and stop for good. Observers are not called
    /// again, even for changes made before the call. Calling it again does
    /// nothing.
    pub fn destroy(&self) {
        let mut core = self.shared.core.borrow_mut();
        if !core.active {
            return;
        }
        core.active = false;
        if let Some(handle) = core.pending.take() {
            self.shared.scheduler.cancel(handle);
        }
        log::debug!("Destroyed typewriter at cursor {}", core.state.cursor());
    }
}

impl<S: Scheduler + 'static> Drop for Typewriter<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn restart<S: Scheduler + 'static>(shared: &Rc<Shared<S>>, core: &mut Core) -> Vec<Snapshot> {
    if let Some(handle) = core.pending.take() {
        shared.scheduler.cancel(handle);
    }
    core.state = AnimationState::new();
    let mut events = vec![core.snapshot()];
    if core.state.resolve(core.len).is_some() {
        events.push(core.snapshot());
    }
    schedule_next(shared, core);
    events
}

fn schedule_next<S: Scheduler + 'static>(shared: &Rc<Shared<S>>, core: &mut Core) {
    if let Some(handle) = core.pending.take() {
        shared.scheduler.cancel(handle);
    }
    core.generation = core.generation.wrapping_add(1);
    let generation = core.generation;
    let delay = core.state.delay(&core.config);

    let weak: Weak<Shared<S>> = Rc::downgrade(shared);
    let callback = Box::new(move || {
        if let Some(shared) = weak.upgrade() {
            on_tick(&shared, generation);
        }
    });

    match shared.scheduler.schedule_after(delay, callback) {
        Ok(handle) => core.pending = Some(handle),
        Err(e) => log::error!(
            "Failed to schedule typewriter tick, animation paused: {}",
            e
        ),
    }
}

fn on_tick<S: Scheduler + 'static>(shared: &Rc<Shared<S>>, generation: u64) {
    let events = {
        let mut core = shared.core.borrow_mut();
        if !core.active || core.generation != generation {
            return;
        }
        core.pending = None;

        let len = core.len;
        core.state.tick(len);
        let mut events = vec![core.snapshot()];
        if core.state.resolve(len).is_some() {
            events.push(core.snapshot());
        }
        log::trace!(
            "Typewriter tick: {:?} at {}/{}",
            core.state.phase(),
            core.state.cursor(),
            len
        );

        schedule_next(shared, &mut core);
        events
    };
    notify(shared, &events);
}

fn notify<S>(shared: &Shared<S>, events: &[Snapshot]) {
    let Ok(mut observers) = shared.observers.try_borrow_mut() else {
        log::trace!("Skipping nested typewriter notification");
        return;
    };
    for event in events {
        for observer in observers.iter_mut() {
            // An observer may have destroyed the instance
            if !shared.core.borrow().active {
                return;
            }
            observer(event);
        }
    }
}
