use std::time::Duration;

/// Default delay between typed characters
pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(100);
/// Default delay between deleted characters
pub const DEFAULT_DELETING_DELAY: Duration = Duration::from_millis(50);
/// Default pause with the full text shown
pub const DEFAULT_LOOP_DELAY: Duration = Duration::from_millis(2000);
/// Default multiple of the typing delay waited after the text is fully deleted
pub const DEFAULT_SETTLE_FACTOR: u32 = 5;

/// Configuration for a [`Typewriter`](super::Typewriter)
///
/// ```ignore
/// let config = AnimationConfig::new("Hello")
///     .typing_delay(Duration::from_millis(80))
///     .loop_delay(Duration::from_secs(1));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationConfig {
    /// Text typed out and deleted on every cycle
    pub text: String,
    /// Delay before each appended character
    pub typing_delay: Duration,
    /// Delay before each removed character
    pub deleting_delay: Duration,
    /// Pause after the text is fully typed, before deleting starts
    pub loop_delay: Duration,
    /// The pause after a full deletion lasts `settle_factor * typing_delay`
    pub settle_factor: u32,
}

impl AnimationConfig {
    /// Create a config for `text` with the default timing
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Build from text that may be absent. Missing text animates as `""`.
    pub fn from_optional(text: Option<impl Into<String>>) -> Self {
        Self {
            text: text.map(Into::into).unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Set the text to type
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the delay before each typed character
    pub fn typing_delay(mut self, delay: Duration) -> Self {
        self.typing_delay = delay;
        self
    }

    /// Set the delay before each deleted character
    pub fn deleting_delay(mut self, delay: Duration) -> Self {
        self.deleting_delay = delay;
        self
    }

    /// Set the pause after the text is fully typed
    pub fn loop_delay(mut self, delay: Duration) -> Self {
        self.loop_delay = delay;
        self
    }

    /// Set how many typing delays to wait after the text is fully deleted
    pub fn settle_factor(mut self, factor: u32) -> Self {
        self.settle_factor = factor;
        self
    }

    /// Set the typing delay from signed milliseconds. Negative values become zero.
    pub fn typing_delay_ms(self, ms: i64) -> Self {
        self.typing_delay(clamp_ms(ms))
    }

    /// Set the deleting delay from signed milliseconds. Negative values become zero.
    pub fn deleting_delay_ms(self, ms: i64) -> Self {
        self.deleting_delay(clamp_ms(ms))
    }

    /// Set the loop delay from signed milliseconds. Negative values become zero.
    pub fn loop_delay_ms(self, ms: i64) -> Self {
        self.loop_delay(clamp_ms(ms))
    }

    /// Pause after the text is fully deleted, before typing restarts
    pub fn settle_delay(&self) -> Duration {
        self.typing_delay.saturating_mul(self.settle_factor)
    }

    /// Length of the text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            typing_delay: DEFAULT_TYPING_DELAY,
            deleting_delay: DEFAULT_DELETING_DELAY,
            loop_delay: DEFAULT_LOOP_DELAY,
            settle_factor: DEFAULT_SETTLE_FACTOR,
        }
    }
}

fn clamp_ms(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}
