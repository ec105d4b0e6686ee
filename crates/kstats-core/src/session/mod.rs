//! Session domain module.
//!
//! - `clock`: per-scene time accumulation (`SessionClock`, `SceneTag`)
//! - `state`: the elected instance's mutable session record (`SessionState`)

mod clock;
mod state;

pub use clock::{SceneTag, SessionClock};
pub use state::{SessionState, DEFAULT_CHECKPOINT_SECS};
