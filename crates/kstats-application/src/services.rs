//! Collaborators of a running plugin.

use chrono::TimeDelta;
use kstats_core::config::{ConfigRepository, TelemetrySettings};
use kstats_core::report::ReportStore;
use kstats_core::upload::Transport;
use kstats_infrastructure::{
    CfgConfigRepository, FileReportStore, HttpTransport, KstatsPaths, UpdateChecker,
};
use std::path::Path;
use std::sync::Arc;

/// Storage, transport and update collaborators.
///
/// [`Services::from_settings`] wires the file and HTTP implementations; tests
/// and alternative hosts can assemble their own.
pub struct Services {
    pub store: Arc<dyn ReportStore>,
    pub config: Arc<dyn ConfigRepository>,
    /// Without a transport, reports stay queued on disk.
    pub transport: Option<Arc<dyn Transport>>,
    pub updater: Option<Arc<UpdateChecker>>,
    pub checkpoint_interval: TimeDelta,
}

impl Services {
    /// Builds the production collaborators for a plugin installed at
    /// `install_dir`.
    pub fn from_settings(
        install_dir: &Path,
        settings: &TelemetrySettings,
    ) -> anyhow::Result<Self> {
        let paths = KstatsPaths::resolve(install_dir, settings);
        let store = FileReportStore::new(&paths.data_dir)?;
        let config = CfgConfigRepository::with_path(paths.config_file());

        let transport: Option<Arc<dyn Transport>> = match &settings.submit_url {
            Some(url) => Some(Arc::new(HttpTransport::new(
                url.clone(),
                settings.http_timeout(),
            )?)),
            None => {
                tracing::info!("[Services] no submit URL configured; reports stay queued");
                None
            }
        };

        let updater = match &settings.manifest_url {
            Some(url) => Some(Arc::new(UpdateChecker::new(
                url.clone(),
                &paths.install_dir,
                settings.http_timeout(),
            )?)),
            None => None,
        };

        Ok(Self {
            store: Arc::new(store),
            config: Arc::new(config),
            transport,
            updater,
            checkpoint_interval: settings.checkpoint_interval(),
        })
    }
}
