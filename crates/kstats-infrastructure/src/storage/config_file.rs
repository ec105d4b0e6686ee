//! The user configuration file.
//!
//! Plain `key = value` lines; lines starting with `//` are comments:
//!
//! ```text
//! // KStats anonymous telemetry
//! id = 3f2b0c9d6e8a4b1c9f0e7d6c5b4a3928
//! disabled = false
//! update = true
//! ```
//!
//! Keys this component does not know are kept when the file is rewritten.

use super::atomic_file::{read_lossy_if_exists, write_atomic};
use kstats_core::config::{AnonymousId, ConfigRepository, Configuration};
use kstats_core::error::Result;
use std::path::{Path, PathBuf};

const HEADER: &str = "// KStats anonymous telemetry. Set disabled = true to opt out.";
const KEY_ID: &str = "id";
const KEY_DISABLED: &str = "disabled";
const KEY_UPDATE: &str = "update";

/// `ConfigRepository` over a `key = value` file.
pub struct CfgConfigRepository {
    path: PathBuf,
}

impl CfgConfigRepository {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Vec<(String, String)>> {
        // Hand-edited files are not always UTF-8; keys are plain ASCII.
        Ok(read_lossy_if_exists(&self.path)?
            .map(|content| parse_entries(&content))
            .unwrap_or_default())
    }
}

/// Splits a config document into `(key, value)` pairs in file order.
pub fn parse_entries(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        tracing::warn!(
            "[CfgConfigRepository] ignoring non-boolean value '{}' for '{}'",
            value,
            key
        );
        None
    }
}

impl ConfigRepository for CfgConfigRepository {
    fn load(&self) -> Result<Configuration> {
        let mut config = Configuration::default();
        for (key, value) in self.read_entries()? {
            match key.as_str() {
                KEY_ID => match value.parse::<AnonymousId>() {
                    Ok(id) => config.id = Some(id),
                    Err(e) => {
                        tracing::warn!("[CfgConfigRepository] {}; a new id will be generated", e)
                    }
                },
                KEY_DISABLED => config.disabled = parse_bool(&key, &value),
                KEY_UPDATE => config.update = parse_bool(&key, &value),
                _ => {}
            }
        }
        Ok(config)
    }

    fn save(&self, config: &Configuration) -> Result<()> {
        let mut lines = vec![HEADER.to_string()];
        if let Some(id) = &config.id {
            lines.push(format!("{} = {}", KEY_ID, id));
        }
        if let Some(disabled) = config.disabled {
            lines.push(format!("{} = {}", KEY_DISABLED, disabled));
        }
        if let Some(update) = config.update {
            lines.push(format!("{} = {}", KEY_UPDATE, update));
        }
        for (key, value) in self.read_entries()? {
            if ![KEY_ID, KEY_DISABLED, KEY_UPDATE].contains(&key.as_str()) {
                lines.push(format!("{} = {}", key, value));
            }
        }
        lines.push(String::new());

        write_atomic(&self.path, lines.join("\n").as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_entries_skips_comments_and_blanks() {
        let entries = parse_entries("// header\n\n  disabled = True \nnot a pair\nupdate=false\n");
        assert_eq!(
            entries,
            vec![
                ("disabled".to_string(), "True".to_string()),
                ("update".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let repo = CfgConfigRepository::with_path(temp_dir.path().join("kstats.cfg"));

        assert_eq!(repo.load().unwrap(), Configuration::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let repo = CfgConfigRepository::with_path(temp_dir.path().join("kstats.cfg"));
        let config = Configuration {
            id: Some(AnonymousId::generate()),
            disabled: Some(false),
            update: None,
        };

        repo.save(&config).unwrap();

        assert_eq!(repo.load().unwrap(), config);
        let content = fs::read_to_string(repo.path()).unwrap();
        assert!(content.starts_with("//"));
        assert!(!content.contains("update"));
    }

    #[test]
    fn test_corrupt_id_loads_as_unset() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kstats.cfg");
        fs::write(&path, "id = zz-not-hex\ndisabled = true\n").unwrap();

        let config = CfgConfigRepository::with_path(&path).load().unwrap();

        assert!(config.id.is_none());
        assert_eq!(config.disabled, Some(true));
    }

    #[test]
    fn test_non_utf8_comment_keeps_opt_out() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kstats.cfg");
        fs::write(&path, b"// D\xe9sactiv\xe9\ndisabled = true\n").unwrap();

        let config = CfgConfigRepository::with_path(&path).load().unwrap();

        assert!(config.is_disabled());
    }

    #[test]
    fn test_unknown_keys_survive_rewrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kstats.cfg");
        fs::write(&path, "// mine\nfavourite_kerbal = Jeb\nupdate = maybe\n").unwrap();
        let repo = CfgConfigRepository::with_path(&path);

        let mut config = repo.load().unwrap();
        assert!(config.update.is_none());
        config.update = Some(true);
        repo.save(&config).unwrap();

        let entries = parse_entries(&fs::read_to_string(&path).unwrap());
        assert!(entries.contains(&("favourite_kerbal".to_string(), "Jeb".to_string())));
        assert!(entries.contains(&("update".to_string(), "true".to_string())));
        assert_eq!(entries.iter().filter(|(k, _)| k == "update").count(), 1);
    }
}
