//! Report domain module.
//!
//! - `model`: the immutable `Report` record and its parts
//! - `builder`: assembles reports from session state and host metadata
//! - `store`: durable queue interface (`ReportStore`)

mod builder;
mod model;
mod store;

pub use builder::ReportBuilder;
pub use model::{EnvironmentInfo, ModuleDescriptor, Report};
pub use store::{ReportStore, SlotId};
