pub mod http_transport;
pub mod paths;
pub mod storage;
pub mod update_checker;

pub use crate::http_transport::HttpTransport;
pub use crate::paths::KstatsPaths;
pub use crate::storage::{CfgConfigRepository, FileReportStore};
pub use crate::update_checker::UpdateChecker;
