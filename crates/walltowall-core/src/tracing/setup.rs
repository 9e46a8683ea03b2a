//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding per-module log levels.
pub const LOG_ENV_VAR: &str = "WALLTOWALL_LOG";

/// Default filter when `WALLTOWALL_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "walltowall=info";

/// Initialize the walltowall tracing/logging system.
///
/// Reads `WALLTOWALL_LOG` for per-module log levels, e.g.
/// `WALLTOWALL_LOG=walltowall_prepare::disturbance=debug,walltowall_storage=warn`.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // A host application may already have installed a global subscriber.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .try_init();
    });
}
