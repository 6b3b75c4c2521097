//! The four-phase typing/deleting cycle.
//!
//! [`AnimationState`] holds nothing but a cursor and a phase. It knows how to
//! apply one tick and which delay the next tick needs, but it never touches a
//! timer; [`Typewriter`](super::Typewriter) drives it.
//!
//! ```text
//! Typing --(cursor == len)--> PausingAfterType --> Deleting
//!   ^                                                 |
//!   +------- PausingAfterDelete <--(cursor == 0)------+
//! ```

use std::time::Duration;

use super::config::AnimationConfig;

/// Phase of the typing cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Appending one character per tick
    Typing,
    /// Holding the full text for the loop delay
    PausingAfterType,
    /// Removing one character per tick
    Deleting,
    /// Holding the empty text for the settle delay
    PausingAfterDelete,
}

impl Phase {
    /// The phase that follows this one in the cycle
    pub fn next(self) -> Phase {
        match self {
            Phase::Typing => Phase::PausingAfterType,
            Phase::PausingAfterType => Phase::Deleting,
            Phase::Deleting => Phase::PausingAfterDelete,
            Phase::PausingAfterDelete => Phase::Typing,
        }
    }
}

/// Cursor and phase of one running animation.
///
/// Invariant: `cursor <= len` for the `len` it is driven with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationState {
    cursor: usize,
    phase: Phase,
}

impl AnimationState {
    /// Start of a cycle: nothing typed, typing next
    pub fn new() -> Self {
        Self {
            cursor: 0,
            phase: Phase::Typing,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Apply one tick for a text of `len` characters.
    pub fn tick(&mut self, len: usize) {
        match self.phase {
            Phase::Typing => {
                self.cursor = (self.cursor + 1).min(len);
                if self.cursor == len {
                    self.phase = Phase::PausingAfterType;
                }
            }
            Phase::PausingAfterType => self.phase = Phase::Deleting,
            Phase::Deleting => {
                self.cursor = self.cursor.saturating_sub(1);
                if self.cursor == 0 {
                    self.phase = Phase::PausingAfterDelete;
                }
            }
            Phase::PausingAfterDelete => self.phase = Phase::Typing,
        }
    }

    /// Leave a phase whose entry condition does not hold.
    ///
    /// `Typing` with nothing left to type and `Deleting` with nothing left to
    /// delete complete with zero ticks. Returns the phase that was passed
    /// through, if any. A single call is always enough: both pause phases
    /// are valid at the cursor they are entered with.
    pub fn resolve(&mut self, len: usize) -> Option<Phase> {
        let passed = match self.phase {
            Phase::Typing if self.cursor >= len => Phase::Typing,
            Phase::Deleting if self.cursor == 0 => Phase::Deleting,
            _ => return None,
        };
        self.cursor = self.cursor.min(len);
        self.phase = passed.next();
        Some(passed)
    }

    /// Delay before the next tick in the current phase
    pub fn delay(&self, config: &AnimationConfig) -> Duration {
        match self.phase {
            Phase::Typing => config.typing_delay,
            Phase::PausingAfterType => config.loop_delay,
            Phase::Deleting => config.deleting_delay,
            Phase::PausingAfterDelete => config.settle_delay(),
        }
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new()
    }
}

/// The first `cursor` characters of `text`
pub fn visible_prefix(text: &str, cursor: usize) -> &str {
    match text.char_indices().nth(cursor) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
