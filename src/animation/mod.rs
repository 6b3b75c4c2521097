mod config;
mod state;
mod typewriter;

pub use config::{
    AnimationConfig, DEFAULT_DELETING_DELAY, DEFAULT_LOOP_DELAY, DEFAULT_SETTLE_FACTOR,
    DEFAULT_TYPING_DELAY,
};
pub use state::{visible_prefix, AnimationState, Phase};
pub use typewriter::{Snapshot, Typewriter};
