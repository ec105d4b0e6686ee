use crate::report::Report;
use async_trait::async_trait;
use thiserror::Error;

/// Why a single delivery attempt failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The endpoint answered with a non-2xx status.
    #[error("endpoint rejected report with status {0}")]
    Status(u16),

    /// The request never completed (DNS, connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The report could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(String),
}

/// Delivers one report to the collection endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns `Ok(())` only when the endpoint confirmed delivery.
    async fn submit(&self, report: &Report) -> Result<(), TransportError>;
}
