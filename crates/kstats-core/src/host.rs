//! Host-facing traits.
//!
//! The game process owns module loading, scene management and build
//! metadata. The embedding glue implements these traits; everything in this
//! workspace talks to the host only through them.

use crate::arbitration::VersionCell;
use crate::error::InspectError;
use crate::report::EnvironmentInfo;
use crate::session::SceneTag;
use std::path::PathBuf;
use std::sync::Arc;

/// One module (assembly) loaded into the host process.
pub trait LoadedModule: Send + Sync {
    /// Simple name of the module, unique within the process.
    fn name(&self) -> &str;

    /// Declared module version, if the host exposes one.
    fn version(&self) -> Option<String>;

    /// File version recorded in the module's file metadata.
    fn file_version(&self) -> Option<String>;

    /// Human-readable title attribute.
    ///
    /// Reading custom metadata can fail for modules built against missing
    /// dependencies, hence the `Result`.
    fn title(&self) -> Result<Option<String>, InspectError>;

    /// Looks up a copy of the component named `type_name` inside this module.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(cell))`: the module carries the component and its declared
    ///   version marker is integer-typed
    /// - `Ok(None)`: no such component, or its marker is not an integer
    /// - `Err(_)`: the module could not be introspected
    fn version_marker(&self, type_name: &str) -> Result<Option<Arc<VersionCell>>, InspectError>;
}

/// Enumerates the modules currently loaded in the process.
pub trait ModuleCatalog: Send + Sync {
    /// All loaded modules in host load order. Index 0 is the host's own
    /// primary module.
    fn loaded_modules(&self) -> Vec<Arc<dyn LoadedModule>>;
}

/// Everything the telemetry session needs from the running game.
pub trait GameHost: ModuleCatalog {
    /// The scene the game is currently in, polled once per tick.
    fn current_scene(&self) -> SceneTag;

    /// Build and platform metadata for reports.
    fn environment(&self) -> EnvironmentInfo;

    /// Directory this plugin is installed in. Self-update writes below it.
    fn install_dir(&self) -> PathBuf;
}
