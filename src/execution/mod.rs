// Execution module - feeding lifecycle events to reporters

pub mod events;
pub mod replay;

pub use events::{EventStatus, LifecycleEvent};
pub use replay::{Replayer, replay_reader, replay_str};
