//! Report delivery.
//!
//! - `transport`: the black-box request/response channel (`Transport`)
//! - `uploader`: ordered, best-effort draining of a `ReportStore`

mod transport;
mod uploader;

pub use transport::{Transport, TransportError};
pub use uploader::{FlushSummary, Uploader};
