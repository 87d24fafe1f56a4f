//! Structured logging infrastructure for launchpad nodes.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter`. The level
//! comes from `RUST_LOG` when set, otherwise from the configured default.

use crate::config::LogConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize the logging system with human-readable output.
///
/// # Example
/// ```no_run
/// use launchpad_core::logging;
///
/// logging::init("info");
/// tracing::info!("Node started");
/// ```
pub fn init(default_level: &str) {
    tracing_subscriber::registry()
        .with(filter(default_level))
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .init();
}

/// Initialize the logging system with JSON output for log aggregation.
///
/// # Example
/// ```no_run
/// use launchpad_core::logging;
///
/// logging::init_json("info");
/// tracing::info!(launchpad = "Launchpad-01", "Node started");
/// ```
pub fn init_json(default_level: &str) {
    tracing_subscriber::registry()
        .with(filter(default_level))
        .with(fmt::layer().json().with_target(true).with_thread_ids(true))
        .init();
}

/// Initialize logging as described by the `[log]` config section.
pub fn init_from_config(config: &LogConfig) {
    if config.json {
        init_json(&config.level);
    } else {
        init(&config.level);
    }
}
