pub mod arbitration;
pub mod clock;
pub mod config;
pub mod error;
pub mod host;
pub mod report;
pub mod session;
pub mod update;
pub mod upload;

// Re-export common error type
pub use error::TelemetryError;

/// Name sent to the collection endpoint to identify this component.
pub const COMPONENT_NAME: &str = "KStats";

/// Structural identity shared by every copy of the component. Arbitration
/// matches loaded copies on this name.
pub const COMPONENT_TYPE_NAME: &str = "KStats.TelemetryPlugin";

/// Informational build version of this copy.
pub const COMPONENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Declared compatibility version used in arbitration. Bump whenever a
/// release must take over from older bundled copies.
pub const DECLARED_VERSION: i64 = 1;

/// Version of the report wire format.
pub const PROTOCOL_VERSION: u32 = 1;
