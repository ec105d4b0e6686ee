//! The elected instance's lifecycle.
//!
//! ```text
//! start ──arbitration lost──▶ Yielded
//!   │
//!   ├─disabled──▶ Disabled
//!   │
//!   ▼
//! recover checkpoint → spawn flush → Running ─tick*─▶ shutdown → final flush
//! ```
//!
//! Nothing here ever returns an error to the host. Every failure is logged
//! and the plugin degrades: skips a checkpoint, defers an upload, or stays
//! inert.

use crate::services::Services;
use chrono::{DateTime, Utc};
use kstats_core::arbitration::{ArbitrationResult, TieBreak, VersionCell, VersionRegistry};
use kstats_core::clock::Clock;
use kstats_core::config::{ConfigRepository, Configuration, TelemetrySettings, UpdatePolicy};
use kstats_core::host::GameHost;
use kstats_core::report::{ReportBuilder, ReportStore};
use kstats_core::session::SessionState;
use kstats_core::upload::{FlushSummary, Uploader};
use kstats_core::{COMPONENT_TYPE_NAME, DECLARED_VERSION};
use kstats_infrastructure::{KstatsPaths, UpdateChecker};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// What the host glue hands to a freshly loaded copy of the plugin.
#[derive(Clone)]
pub struct PluginContext {
    pub host: Arc<dyn GameHost>,
    /// This copy's declared-version marker, as exposed to the other copies.
    pub version_cell: Arc<VersionCell>,
    pub declared_version: i64,
    pub clock: Arc<dyn Clock>,
    /// Runtime that uploads and update checks are spawned on.
    pub runtime: Handle,
    pub tie_break: TieBreak,
}

impl PluginContext {
    pub fn new(
        host: Arc<dyn GameHost>,
        version_cell: Arc<VersionCell>,
        clock: Arc<dyn Clock>,
        runtime: Handle,
    ) -> Self {
        Self {
            host,
            version_cell,
            declared_version: DECLARED_VERSION,
            clock,
            runtime,
            tie_break: TieBreak::default(),
        }
    }
}

/// Result of [`TelemetryPlugin::start`].
pub enum StartOutcome {
    /// This copy won arbitration and is recording.
    Running(TelemetryPlugin),
    /// Another copy declared a higher version; this one does nothing.
    Yielded(ArbitrationResult),
    /// This copy won, but the user opted out of telemetry.
    Disabled,
    /// This copy won, but its storage could not be set up.
    Unavailable,
}

impl StartOutcome {
    pub fn into_running(self) -> Option<TelemetryPlugin> {
        match self {
            StartOutcome::Running(plugin) => Some(plugin),
            _ => None,
        }
    }
}

struct Session {
    state: SessionState,
    finished: bool,
}

pub struct TelemetryPlugin {
    host: Arc<dyn GameHost>,
    clock: Arc<dyn Clock>,
    runtime: Handle,
    builder: ReportBuilder,
    store: Arc<dyn ReportStore>,
    config_repo: Arc<dyn ConfigRepository>,
    config: Mutex<Configuration>,
    uploader: Option<Arc<Uploader>>,
    updater: Option<Arc<UpdateChecker>>,
    // Serializes every mutation of session state and of the store.
    session: Mutex<Session>,
}

impl TelemetryPlugin {
    /// Arbitrates, then wires production services from the install directory.
    pub fn start(ctx: PluginContext) -> StartOutcome {
        crate::logging::init_tracing();

        if let Some(lost) = Self::arbitrate(&ctx) {
            return StartOutcome::Yielded(lost);
        }

        let install_dir = ctx.host.install_dir();
        let settings = KstatsPaths::load_settings(&install_dir).unwrap_or_else(|e| {
            tracing::warn!("[TelemetryPlugin] unusable settings.toml, using defaults: {}", e);
            TelemetrySettings::default().with_env_overrides()
        });
        match Services::from_settings(&install_dir, &settings) {
            Ok(services) => Self::launch(ctx, services),
            Err(e) => {
                tracing::error!("[TelemetryPlugin] telemetry unavailable: {:#}", e);
                StartOutcome::Unavailable
            }
        }
    }

    /// Arbitrates, then runs with the given services.
    pub fn start_with(ctx: PluginContext, services: Services) -> StartOutcome {
        if let Some(lost) = Self::arbitrate(&ctx) {
            return StartOutcome::Yielded(lost);
        }
        Self::launch(ctx, services)
    }

    /// Returns the result when this copy lost.
    fn arbitrate(ctx: &PluginContext) -> Option<ArbitrationResult> {
        let result = VersionRegistry::new(ctx.host.as_ref(), COMPONENT_TYPE_NAME)
            .with_tie_break(ctx.tie_break)
            .arbitrate(&ctx.version_cell, ctx.declared_version);
        (!result.is_self).then_some(result)
    }

    fn launch(ctx: PluginContext, services: Services) -> StartOutcome {
        // An opt-out that cannot be read must still be honoured.
        let mut config = match services.config.load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("[TelemetryPlugin] cannot read configuration, staying off: {}", e);
                return StartOutcome::Disabled;
            }
        };
        let (id, created) = config.ensure_identity();
        if created {
            if let Err(e) = services.config.save(&config) {
                tracing::warn!("[TelemetryPlugin] cannot persist new identifier: {}", e);
            }
        }

        if config.is_disabled() {
            tracing::info!("[TelemetryPlugin] telemetry disabled by configuration");
            return StartOutcome::Disabled;
        }

        if let Err(e) = services.store.recover_checkpoint() {
            tracing::warn!("[TelemetryPlugin] checkpoint recovery failed: {}", e);
        }

        let now = ctx.clock.now();
        let mut state = SessionState::new(id, now, services.checkpoint_interval);
        state.clock.on_scene_observed(&ctx.host.current_scene(), now);

        let uploader = services
            .transport
            .map(|transport| Arc::new(Uploader::new(transport, services.store.clone())));

        let plugin = TelemetryPlugin {
            builder: ReportBuilder::new(ctx.host.clone()),
            host: ctx.host,
            clock: ctx.clock,
            runtime: ctx.runtime,
            store: services.store,
            config_repo: services.config,
            config: Mutex::new(config),
            uploader,
            updater: services.updater,
            session: Mutex::new(Session {
                state,
                finished: false,
            }),
        };

        plugin.spawn_flush();
        if plugin.update_policy() == UpdatePolicy::OptedIn {
            plugin.spawn_update_check();
        }

        tracing::info!("[TelemetryPlugin] session started");
        StartOutcome::Running(plugin)
    }

    /// Per-frame callback. Never blocks on network I/O.
    pub fn tick(&self) {
        let now = self.clock.now();
        let scene = self.host.current_scene();

        let mut session = self.lock_session();
        if session.finished {
            return;
        }
        session.state.clock.on_scene_observed(&scene, now);

        if session.state.checkpoint_due(now) {
            self.write_checkpoint(&mut session.state, now);
            session.state.schedule_next_checkpoint(now);
        }
    }

    fn write_checkpoint(&self, state: &mut SessionState, now: DateTime<Utc>) {
        let report = self.builder.build_checkpoint(state, now);
        if let Err(e) = self.store.enqueue_checkpoint(&report) {
            tracing::warn!("[TelemetryPlugin] checkpoint write failed: {}", e);
        }
    }

    /// Finalizes the session and makes one last delivery attempt.
    ///
    /// Only the first call does anything.
    pub async fn shutdown(&self) -> Option<FlushSummary> {
        {
            let now = self.clock.now();
            let mut session = self.lock_session();
            if session.finished {
                return None;
            }
            session.finished = true;

            let report = self.builder.build_final(&mut session.state, now);
            match self.store.commit_final(&report) {
                Ok(slot) => {
                    tracing::info!("[TelemetryPlugin] session report queued in slot {}", slot)
                }
                Err(e) => tracing::error!("[TelemetryPlugin] cannot queue session report: {}", e),
            }
        }
        self.flush().await
    }

    /// Delivers queued reports now. `None` when no transport is configured.
    pub async fn flush(&self) -> Option<FlushSummary> {
        match &self.uploader {
            Some(uploader) => Some(uploader.flush().await),
            None => None,
        }
    }

    /// Starts a background flush without waiting for it.
    pub fn spawn_flush(&self) -> Option<JoinHandle<FlushSummary>> {
        let uploader = self.uploader.clone()?;
        Some(self.runtime.spawn(async move { uploader.flush().await }))
    }

    fn spawn_update_check(&self) -> Option<JoinHandle<()>> {
        let updater = self.updater.clone()?;
        Some(self.runtime.spawn(async move {
            match updater.check_and_apply().await {
                Ok(outcome) => tracing::info!(
                    "[TelemetryPlugin] update wrote {} file(s), skipped {}",
                    outcome.written.len(),
                    outcome.skipped.len()
                ),
                Err(e) => tracing::error!("[TelemetryPlugin] update check failed: {:#}", e),
            }
        }))
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.lock_config().update_policy()
    }

    /// Records the user's answer to the self-update prompt.
    pub fn set_update_consent(&self, opted_in: bool) {
        {
            let mut config = self.lock_config();
            config.update = Some(opted_in);
            if let Err(e) = self.config_repo.save(&config) {
                tracing::warn!("[TelemetryPlugin] cannot persist update consent: {}", e);
            }
        }
        if opted_in {
            self.spawn_update_check();
        }
    }

    /// Snapshot of the running session state.
    pub fn session_snapshot(&self) -> SessionState {
        self.lock_session().state.clone()
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_config(&self) -> MutexGuard<'_, Configuration> {
        self.config.lock().unwrap_or_else(|e| e.into_inner())
    }
}
