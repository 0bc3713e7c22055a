//! Logging infrastructure for sheetdict
//!
//! Console output plus optional daily-rotated files in the app data directory.
//!
//! ## Usage
//!
//! ```no_run
//! use sheetdict::{config::LogOptions, logging};
//!
//! // Initialize once at startup
//! logging::init(&LogOptions::default()).expect("Failed to initialize logging");
//!
//! tracing::info!("App started");
//! ```

use crate::config::LogOptions;
use crate::error::{DictionaryError, Result, ResultExt as _};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Gets the log directory path based on platform conventions
///
/// Returns:
/// - Windows: `%APPDATA%/sheetdict/logs`
/// - macOS: `~/Library/Application Support/sheetdict/logs`
/// - Linux: `~/.local/share/sheetdict/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir()
        .ok_or_else(|| DictionaryError::Config("Failed to determine data directory".to_owned()))?;

    Ok(base_dir.join("sheetdict").join("logs"))
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    }
    Ok(())
}

fn rolling_appender(dir: &Path, prefix: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(dir)
        .map_err(|e| DictionaryError::Config(format!("Failed to create {prefix} log appender: {e}")))
}

/// Initializes the logging system.
///
/// With `file_logging` on, two files are written next to the console output:
/// - `sheetdict.log`: everything that passes the filter
/// - `error.log`: warnings and errors only
///
/// # Errors
///
/// Returns error if the filter directive is invalid, the log directory cannot be
/// created, or a subscriber is already installed.
pub fn init(options: &LogOptions) -> Result<()> {
    // Default to the requested level, allow override with RUST_LOG
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.level))
        .map_err(|e| DictionaryError::Config(format!("Invalid log filter: {e}")))?;

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_writer(std::io::stderr);

    let (file_layers, log_dir) = if options.file_logging {
        let log_dir = match &options.log_dir {
            Some(dir) => dir.clone(),
            None => get_log_dir()?,
        };
        ensure_dir(&log_dir)?;

        let all_logs_layer = fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false)
            .with_writer(rolling_appender(&log_dir, "sheetdict")?);

        let error_logs_layer = fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false)
            .with_writer(rolling_appender(&log_dir, "error")?)
            .with_filter(EnvFilter::new("warn"));

        (Some(all_logs_layer.and_then(error_logs_layer)), Some(log_dir))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layers)
        .try_init()
        .map_err(|e| DictionaryError::Config(format!("Failed to install subscriber: {e}")))?;

    match log_dir {
        Some(dir) => tracing::debug!("Logging initialized, log directory: {:?}", dir),
        None => tracing::debug!("Logging initialized (console only)"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_dir() {
        let log_dir = get_log_dir().expect("Failed to get log dir");
        assert!(log_dir.ends_with("sheetdict/logs") || log_dir.ends_with("sheetdict\\logs"));
    }
}
