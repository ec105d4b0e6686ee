use super::model::{ModuleDescriptor, Report};
use crate::host::GameHost;
use crate::session::SessionState;
use crate::{COMPONENT_VERSION, PROTOCOL_VERSION};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Serializes session state plus host metadata into reports.
///
/// Lives as long as the session so that a module whose metadata cannot be
/// read is only logged once per process.
pub struct ReportBuilder {
    host: Arc<dyn GameHost>,
    inspection_failures: Mutex<HashSet<String>>,
}

impl ReportBuilder {
    pub fn new(host: Arc<dyn GameHost>) -> Self {
        Self {
            host,
            inspection_failures: Mutex::new(HashSet::new()),
        }
    }

    /// Snapshot of the in-progress session, flagged as crashed.
    pub fn build_checkpoint(&self, state: &mut SessionState, now: DateTime<Utc>) -> Report {
        self.build(state, now, true)
    }

    /// The terminal report of a cleanly finished session.
    pub fn build_final(&self, state: &mut SessionState, now: DateTime<Utc>) -> Report {
        self.build(state, now, false)
    }

    fn build(&self, state: &mut SessionState, now: DateTime<Utc>, crashed: bool) -> Report {
        state.clock.flush(now);

        let scenes = state
            .clock
            .elapsed_map_snapshot()
            .into_iter()
            .map(|(scene, duration)| (scene.as_str().to_string(), duration.num_milliseconds()))
            .collect();

        Report {
            id: state.id.clone(),
            started: state.started_at,
            finished: now,
            crashed,
            component_version: COMPONENT_VERSION.to_string(),
            protocol: PROTOCOL_VERSION,
            environment: self.host.environment(),
            scenes,
            modules: self.companion_modules(),
        }
    }

    /// Every loaded module except the host's own primary module.
    fn companion_modules(&self) -> Vec<ModuleDescriptor> {
        self.host
            .loaded_modules()
            .into_iter()
            .skip(1)
            .map(|module| {
                let name = module.name().to_string();
                let title = match module.title() {
                    Ok(title) => title,
                    Err(e) => {
                        self.note_inspection_failure(&name, &e);
                        None
                    }
                };
                ModuleDescriptor {
                    title,
                    version: module.version(),
                    file_version: module.file_version(),
                    name,
                }
            })
            .collect()
    }

    fn note_inspection_failure(&self, name: &str, error: &dyn std::error::Error) {
        let mut seen = self
            .inspection_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if seen.insert(name.to_string()) {
            tracing::warn!("[ReportBuilder] {}", error);
        }
    }

    /// Number of distinct modules whose metadata could not be read so far.
    pub fn inspection_failure_count(&self) -> usize {
        self.inspection_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}
