//! Error types for the telemetry component.

use thiserror::Error;

/// A shared error type for the telemetry component.
///
/// None of these ever reach the host: the plugin lifecycle logs them and
/// degrades (skip, defer) instead of propagating.
#[derive(Error, Debug, Clone)]
pub enum TelemetryError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "TOML"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Report storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TelemetryError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TelemetryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TelemetryError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Failure to introspect a single loaded module.
///
/// Always isolated to the offending module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot inspect module '{module}': {reason}")]
pub struct InspectError {
    pub module: String,
    pub reason: String,
}

impl InspectError {
    pub fn new(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            reason: reason.into(),
        }
    }
}

/// A type alias for `Result<T, TelemetryError>`.
pub type Result<T> = std::result::Result<T, TelemetryError>;
