//! Tracing setup: human-readable output on stderr, plus an optional daily
//! rolling log file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::error::ConfigError;

/// File name prefix for the rolling log.
const LOG_FILE_PREFIX: &str = "nutrition-bot.log";

/// Install the global subscriber. The level comes from `RUST_LOG`, default `info`.
///
/// When `log_dir` is set, logs are also written there; the returned guard
/// must be held for the application lifetime so buffered lines are flushed.
pub fn init(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, ConfigError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        tracing::info!(log_dir = %dir.display(), "File logging enabled");
    }

    Ok(guard)
}
