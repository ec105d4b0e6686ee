//! Deployment settings shipped alongside the plugin.
//!
//! Loaded from an optional `settings.toml`, then overridden by environment
//! variables:
//!
//! - `KSTATS_SUBMIT_URL`
//! - `KSTATS_MANIFEST_URL`
//! - `KSTATS_DATA_DIR`
//! - `KSTATS_CHECKPOINT_SECS`

use crate::error::Result;
use crate::session::DEFAULT_CHECKPOINT_SECS;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Longest accepted checkpoint interval: one day.
pub const MAX_CHECKPOINT_SECS: i64 = 86_400;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Report submission endpoint. Without one, reports stay queued on disk.
    pub submit_url: Option<String>,
    /// Update manifest endpoint. Without one, self-update never runs.
    pub manifest_url: Option<String>,
    /// Where the checkpoint and the report queue live.
    pub data_dir: Option<PathBuf>,
    pub checkpoint_interval_secs: i64,
    pub http_timeout_secs: u64,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            submit_url: None,
            manifest_url: None,
            data_dir: None,
            checkpoint_interval_secs: DEFAULT_CHECKPOINT_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl TelemetrySettings {
    /// Parses a `settings.toml` document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `KSTATS_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup, e.g. a fixed map in tests.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("KSTATS_SUBMIT_URL") {
            self.submit_url = Some(url);
        }
        if let Some(url) = lookup("KSTATS_MANIFEST_URL") {
            self.manifest_url = Some(url);
        }
        if let Some(dir) = lookup("KSTATS_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = lookup("KSTATS_CHECKPOINT_SECS") {
            match secs.trim().parse::<i64>() {
                Ok(secs) if secs > 0 => {
                    self.checkpoint_interval_secs = secs.min(MAX_CHECKPOINT_SECS)
                }
                _ => tracing::warn!(
                    "[TelemetrySettings] ignoring invalid KSTATS_CHECKPOINT_SECS '{}'",
                    secs
                ),
            }
        }
        self
    }

    pub fn checkpoint_interval(&self) -> TimeDelta {
        TimeDelta::seconds(self.checkpoint_interval_secs.clamp(1, MAX_CHECKPOINT_SECS))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
