#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use kstats_application::{PluginContext, Services};
use kstats_core::arbitration::VersionCell;
use kstats_core::clock::ManualClock;
use kstats_core::error::InspectError;
use kstats_core::host::{GameHost, LoadedModule, ModuleCatalog};
use kstats_core::report::{EnvironmentInfo, Report};
use kstats_core::session::SceneTag;
use kstats_core::upload::{Transport, TransportError};
use kstats_core::COMPONENT_TYPE_NAME;
use kstats_infrastructure::{CfgConfigRepository, FileReportStore};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
}

pub struct FakeModule {
    pub name: String,
    pub cell: Option<Arc<VersionCell>>,
}

impl LoadedModule for FakeModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<String> {
        Some("1.0.0.0".to_string())
    }

    fn file_version(&self) -> Option<String> {
        None
    }

    fn title(&self) -> Result<Option<String>, InspectError> {
        Ok(Some(self.name.clone()))
    }

    fn version_marker(&self, type_name: &str) -> Result<Option<Arc<VersionCell>>, InspectError> {
        if type_name == COMPONENT_TYPE_NAME {
            Ok(self.cell.clone())
        } else {
            Ok(None)
        }
    }
}

/// A game process with one mod per declared version.
pub struct FakeHost {
    modules: Vec<Arc<dyn LoadedModule>>,
    scene: Mutex<SceneTag>,
    install_dir: PathBuf,
}

impl FakeHost {
    pub fn with_copies(versions: &[i64], install_dir: &Path) -> (Arc<Self>, Vec<Arc<VersionCell>>) {
        let cells: Vec<_> = versions
            .iter()
            .map(|v| Arc::new(VersionCell::new(*v)))
            .collect();
        let mut modules: Vec<Arc<dyn LoadedModule>> = vec![Arc::new(FakeModule {
            name: "Assembly-CSharp".to_string(),
            cell: None,
        })];
        for (i, cell) in cells.iter().enumerate() {
            modules.push(Arc::new(FakeModule {
                name: format!("Mod{i}"),
                cell: Some(cell.clone()),
            }));
        }
        let host = Arc::new(Self {
            modules,
            scene: Mutex::new(SceneTag::new("LOADING")),
            install_dir: install_dir.to_path_buf(),
        });
        (host, cells)
    }

    pub fn enter(&self, scene: &str) {
        *self.scene.lock().unwrap() = SceneTag::new(scene);
    }
}

impl ModuleCatalog for FakeHost {
    fn loaded_modules(&self) -> Vec<Arc<dyn LoadedModule>> {
        self.modules.clone()
    }
}

impl GameHost for FakeHost {
    fn current_scene(&self) -> SceneTag {
        self.scene.lock().unwrap().clone()
    }

    fn environment(&self) -> EnvironmentInfo {
        EnvironmentInfo {
            game_version: "1.12.5".to_string(),
            build_id: Some("03190".to_string()),
            platform: "LinuxPlayer".to_string(),
            language: Some("en-us".to_string()),
        }
    }

    fn install_dir(&self) -> PathBuf {
        self.install_dir.clone()
    }
}

/// Records every submitted report; can be switched to fail.
#[derive(Default)]
pub struct RecordingTransport {
    pub received: Mutex<Vec<Report>>,
    pub failing: AtomicBool,
}

impl RecordingTransport {
    pub fn failing() -> Arc<Self> {
        let transport = Self::default();
        transport.failing.store(true, Ordering::SeqCst);
        Arc::new(transport)
    }

    pub fn received(&self) -> Vec<Report> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn submit(&self, report: &Report) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Status(503));
        }
        self.received.lock().unwrap().push(report.clone());
        Ok(())
    }
}

pub fn services(data_dir: &Path, transport: Arc<RecordingTransport>) -> Services {
    Services {
        store: Arc::new(FileReportStore::new(data_dir).unwrap()),
        config: Arc::new(CfgConfigRepository::with_path(data_dir.join("kstats.cfg"))),
        transport: Some(transport),
        updater: None,
        checkpoint_interval: TimeDelta::seconds(60),
    }
}

pub fn context(
    host: Arc<FakeHost>,
    cell: Arc<VersionCell>,
    declared_version: i64,
    clock: Arc<ManualClock>,
) -> PluginContext {
    let mut ctx = PluginContext::new(host, cell, clock, Handle::current());
    ctx.declared_version = declared_version;
    ctx
}
