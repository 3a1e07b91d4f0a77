//! Logging setup

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::EnvFilter;

use partbin_core::Config;

/// Environment variable holding the log level; logging is off without it
pub const LOG_ENV: &str = "PARTBIN_LOG";

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::new(format!("partbin_core={},partbin_cli={}", level, level))
}

/// Install the tracing subscriber.
///
/// Writes to `config.log_file` when set, otherwise to stderr.
pub fn init(config: &Config) {
    let Ok(level) = std::env::var(LOG_ENV) else {
        return;
    };

    let Some(ref log_path) = config.log_file else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter_for(&level))
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    };

    let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(&level))
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();

    info!("logging to {:?}", log_path);
}
