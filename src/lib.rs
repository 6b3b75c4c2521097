pub mod animation;
pub mod scheduler;

pub mod prelude {
    pub use crate::animation::{AnimationConfig, AnimationState, Phase, Snapshot, Typewriter};
    pub use crate::scheduler::{
        LoopScheduler, ManualScheduler, Scheduler, SchedulerError, TimerCallback, TimerHandle,
    };
}
