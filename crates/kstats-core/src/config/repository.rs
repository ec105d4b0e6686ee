//! Configuration repository trait.

use super::model::Configuration;
use crate::error::Result;

/// Persistence for the user configuration.
///
/// Implementations never fail on a malformed identifier: they log it and
/// report the field as unset so the caller regenerates it.
pub trait ConfigRepository: Send + Sync {
    /// Loads the configuration. A missing file yields the default.
    fn load(&self) -> Result<Configuration>;

    /// Writes the configuration back.
    fn save(&self, config: &Configuration) -> Result<()>;
}
