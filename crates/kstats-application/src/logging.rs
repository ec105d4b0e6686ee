//! Logging bootstrap.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a tracing subscriber filtered by `KSTATS_LOG`.
///
/// Defaults to "info" when `KSTATS_LOG` is unset. Leaves an already installed
/// global subscriber untouched, since the host may have its own.
pub fn init_tracing() {
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("KSTATS_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if installed.is_err() {
        tracing::debug!("[logging] global subscriber already set, keeping it");
    }
}
