//! Cross-instance leader election.
//!
//! Several independently built copies of this component may be loaded into
//! the same game process. Exactly the copies declaring the highest version
//! run; everyone else stops right after arbitration.
//!
//! # Module Structure
//!
//! - `version_cell`: the per-copy atomic declared-version marker
//! - `registry`: candidate discovery and winner selection

mod registry;
mod version_cell;

pub use registry::{ArbitrationResult, Candidate, TieBreak, VersionRegistry};
pub use version_cell::{VersionCell, RETIRED_VERSION};
