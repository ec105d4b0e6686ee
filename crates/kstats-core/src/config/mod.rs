//! Persisted user configuration and deployment settings.

mod model;
mod repository;
mod settings;

pub use model::{AnonymousId, Configuration, UpdatePolicy};
pub use repository::ConfigRepository;
pub use settings::{TelemetrySettings, MAX_CHECKPOINT_SECS};
