//! Tracing subscriber setup for host applications.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::TelemetryConfig;

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Returns false if
/// a subscriber was already installed; that case is logged, not fatal.
pub fn init(config: &TelemetryConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let installed = if config.json {
        fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    match installed {
        Ok(()) => {
            tracing::debug!(json = config.json, "tracing initialised");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "tracing init failed");
            false
        }
    }
}
