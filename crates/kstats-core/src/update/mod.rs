//! Self-update manifest contract.
//!
//! The manifest endpoint returns a JSON array of `{url, path}` entries; each
//! entry is downloaded and written below the plugin's install directory.

use crate::error::{Result, TelemetryError};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// One file to download during a self-update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub url: String,
    /// Target path relative to the install directory.
    pub path: String,
}

impl ManifestEntry {
    /// Resolves the write target under `install_dir`.
    ///
    /// Rejects absolute paths and any path that climbs out with `..`.
    pub fn target_under(&self, install_dir: &Path) -> Result<PathBuf> {
        let relative = Path::new(&self.path);
        let mut clean = PathBuf::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(TelemetryError::config(format!(
                        "manifest path '{}' escapes the install directory",
                        self.path
                    )));
                }
            }
        }
        if clean.as_os_str().is_empty() {
            return Err(TelemetryError::config("manifest entry has an empty path"));
        }
        Ok(install_dir.join(clean))
    }
}

/// Parses a manifest document.
pub fn parse_manifest(content: &str) -> Result<Vec<ManifestEntry>> {
    Ok(serde_json::from_str(content)?)
}

/// Result of one update cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<ManifestEntry>,
}
