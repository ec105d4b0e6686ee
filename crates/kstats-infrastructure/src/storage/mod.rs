//! File-backed storage.
//!
//! - `atomic_file`: tmp-file + fsync + rename writes and cross-process locks
//! - `config_file`: the `key = value` user configuration file
//! - `report_dir`: checkpoint slot and report queue on disk

pub mod atomic_file;
pub mod config_file;
pub mod report_dir;

pub use config_file::CfgConfigRepository;
pub use report_dir::FileReportStore;
