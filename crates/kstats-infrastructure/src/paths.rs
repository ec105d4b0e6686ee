//! Unified path management for kstats files.
//!
//! # Directory Structure
//!
//! ```text
//! <install_dir>/                 # GameData/KStats, owned by the host
//! └── settings.toml              # Optional deployment settings
//!
//! ~/.local/share/kstats/         # Data directory (dirs::data_local_dir)
//! ├── kstats.cfg                 # User configuration (id, disabled, update)
//! ├── checkpoint.json            # Running session snapshot
//! └── queue/                     # Reports waiting for upload
//! ```
//!
//! The data directory can be moved with `settings.data_dir` or
//! `KSTATS_DATA_DIR`. Without a platform data directory, it falls back to
//! `<install_dir>/PluginData`.

use kstats_core::config::TelemetrySettings;
use kstats_core::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "kstats";
const SETTINGS_FILE: &str = "settings.toml";
const CONFIG_FILE: &str = "kstats.cfg";
const FALLBACK_DATA_DIR: &str = "PluginData";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KstatsPaths {
    pub install_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl KstatsPaths {
    /// Resolves all paths for a plugin installed at `install_dir`.
    pub fn resolve(install_dir: impl AsRef<Path>, settings: &TelemetrySettings) -> Self {
        let install_dir = install_dir.as_ref().to_path_buf();
        let data_dir = settings
            .data_dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join(APP_DIR)))
            .unwrap_or_else(|| install_dir.join(FALLBACK_DATA_DIR));
        Self {
            install_dir,
            data_dir,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn settings_file(install_dir: &Path) -> PathBuf {
        install_dir.join(SETTINGS_FILE)
    }

    /// Loads `settings.toml` from `install_dir` (if present) and applies
    /// environment overrides.
    ///
    /// A malformed settings file is an error; a missing one is not.
    pub fn load_settings(install_dir: &Path) -> Result<TelemetrySettings> {
        let path = Self::settings_file(install_dir);
        let settings = match fs::read_to_string(&path) {
            Ok(content) => TelemetrySettings::from_toml_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => TelemetrySettings::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(settings.with_env_overrides())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_data_dir_wins() {
        let settings = TelemetrySettings {
            data_dir: Some(PathBuf::from("/var/kstats")),
            ..TelemetrySettings::default()
        };
        let paths = KstatsPaths::resolve("/ksp/GameData/KStats", &settings);

        assert_eq!(paths.data_dir, PathBuf::from("/var/kstats"));
        assert_eq!(paths.config_file(), PathBuf::from("/var/kstats/kstats.cfg"));
    }

    #[test]
    fn test_settings_file_is_read() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("settings.toml"),
            "checkpoint_interval_secs = 45\nhttp_timeout_secs = 5\n",
        )
        .unwrap();

        let settings = KstatsPaths::load_settings(temp_dir.path()).unwrap();

        assert_eq!(settings.http_timeout_secs, 5);
    }

    #[test]
    fn test_missing_settings_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let settings = KstatsPaths::load_settings(temp_dir.path()).unwrap();
        assert_eq!(settings.http_timeout_secs, TelemetrySettings::default().http_timeout_secs);
    }
}
