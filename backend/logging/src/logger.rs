//! Structured Logger
//!
//! Wraps `tracing` with a console layer and an optional daily-rolling NDJSON
//! file layer. `RUST_LOG` overrides the configured level.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name prefix of the rolling log: `warden.log.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "warden.log";

#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub level: String,
    pub dir: PathBuf,
    /// Also write NDJSON to `dir`.
    pub json_file: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self { level: "info".into(), dir: PathBuf::from("logs"), json_file: true }
    }
}

/// Initialize the global subscriber. A second call is a no-op.
pub fn init_logger(options: &LoggerOptions) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&options.level)
            .with_context(|| format!("Invalid log level: {}", options.level))?,
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    let file_layer = if options.json_file {
        std::fs::create_dir_all(&options.dir)
            .with_context(|| format!("Failed to create log directory: {}", options.dir.display()))?;
        let appender = RollingFileAppender::new(Rotation::DAILY, &options.dir, LOG_FILE_PREFIX);
        Some(fmt::layer().json().with_writer(appender).with_ansi(false).boxed())
    } else {
        None
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
    Ok(())
}
