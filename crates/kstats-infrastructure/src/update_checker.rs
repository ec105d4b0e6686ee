//! Self-update: manifest fetch and file download.
//!
//! Each manifest entry is downloaded as its own task carrying the entry it
//! belongs to, so completions are matched to entries without sharing any
//! mutable state between tasks.

use anyhow::{Context, Result};
use kstats_core::update::{parse_manifest, ManifestEntry, UpdateOutcome};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::task::JoinSet;

pub struct UpdateChecker {
    client: Client,
    manifest_url: String,
    install_dir: PathBuf,
}

impl UpdateChecker {
    pub fn new(
        manifest_url: impl Into<String>,
        install_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            manifest_url: manifest_url.into(),
            install_dir: install_dir.into(),
        })
    }

    /// Fetches the manifest.
    ///
    /// An unreachable endpoint or a malformed document fails this call only.
    pub async fn fetch_manifest(&self) -> Result<Vec<ManifestEntry>> {
        let body = self
            .client
            .get(&self.manifest_url)
            .send()
            .await
            .context("Failed to request update manifest")?
            .error_for_status()
            .context("Update manifest endpoint returned an error")?
            .text()
            .await
            .context("Failed to read update manifest")?;

        parse_manifest(&body).context("Failed to parse update manifest")
    }

    /// Fetches the manifest and writes every listed file under the install
    /// directory.
    ///
    /// Entries that fail to download or that point outside the install
    /// directory are skipped and reported in the outcome.
    pub async fn check_and_apply(&self) -> Result<UpdateOutcome> {
        let entries = self.fetch_manifest().await?;
        tracing::info!("[UpdateChecker] manifest lists {} file(s)", entries.len());

        let mut outcome = UpdateOutcome::default();
        let mut downloads = JoinSet::new();

        for entry in entries {
            let target = match entry.target_under(&self.install_dir) {
                Ok(target) => target,
                Err(e) => {
                    tracing::warn!("[UpdateChecker] skipping entry: {}", e);
                    outcome.skipped.push(entry);
                    continue;
                }
            };
            let client = self.client.clone();
            downloads.spawn(async move {
                let result = download_to(&client, &entry.url, &target).await;
                (entry, target, result)
            });
        }

        while let Some(joined) = downloads.join_next().await {
            let (entry, target, result) = joined.context("Download task panicked")?;
            match result {
                Ok(()) => {
                    tracing::debug!("[UpdateChecker] wrote {}", target.display());
                    outcome.written.push(target);
                }
                Err(e) => {
                    tracing::error!("[UpdateChecker] download of {} failed: {:#}", entry.url, e);
                    outcome.skipped.push(entry);
                }
            }
        }

        outcome.written.sort();
        Ok(outcome)
    }
}

async fn download_to(client: &Client, url: &str, target: &Path) -> Result<()> {
    let bytes = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to request {}", url))?
        .error_for_status()?
        .bytes()
        .await?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file_name = target
        .file_name()
        .context("Download target has no file name")?
        .to_string_lossy()
        .into_owned();
    let tmp = target.with_file_name(format!(".{}.download", file_name));
    fs::write(&tmp, &bytes).await?;
    fs::rename(&tmp, target)
        .await
        .with_context(|| format!("Failed to replace {}", target.display()))?;
    Ok(())
}
