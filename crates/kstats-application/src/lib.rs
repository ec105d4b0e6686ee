//! Lifecycle of the telemetry plugin inside the game process.
//!
//! The host glue calls [`TelemetryPlugin::start`] once when the plugin is
//! loaded, [`TelemetryPlugin::tick`] once per frame, and
//! [`TelemetryPlugin::shutdown`] when the game exits.

pub mod logging;
pub mod plugin;
pub mod services;

pub use plugin::{PluginContext, StartOutcome, TelemetryPlugin};
pub use services::Services;
