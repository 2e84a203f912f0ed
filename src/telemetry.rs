//! Tracing setup

use tracing_subscriber::EnvFilter;

/// Environment variable read for the log filter
pub const LOG_ENV: &str = "SQUATFORM_LOG";

/// Install a fmt subscriber filtered by `SQUATFORM_LOG` (default: `info`).
///
/// Safe to call more than once; only the first call installs a subscriber.
/// Returns whether this call installed it.
pub fn init_tracing() -> bool {
    init_tracing_with(default_filter())
}

/// Install a fmt subscriber with an explicit filter directive.
pub fn init_tracing_with(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}
