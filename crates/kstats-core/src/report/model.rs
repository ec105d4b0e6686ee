use crate::config::AnonymousId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Build and platform metadata of the running game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub game_version: String,
    #[serde(default)]
    pub build_id: Option<String>,
    pub platform: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// One companion module observed in the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    /// Absent when the module's metadata could not be read.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub file_version: Option<String>,
}

/// An immutable session snapshot, ready for upload.
///
/// `crashed` is `true` for checkpoint snapshots and `false` only for the
/// report written at a clean shutdown. Scene durations are whole
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: AnonymousId,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub crashed: bool,
    pub component_version: String,
    pub protocol: u32,
    pub environment: EnvironmentInfo,
    pub scenes: BTreeMap<String, i64>,
    pub modules: Vec<ModuleDescriptor>,
}

impl Report {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
