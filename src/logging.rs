//! Structured JSONL logging plus human-readable stderr output.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (~/.stratum/logs/stratum.jsonl) - structured, one event per line
//! - **Compact to stderr** - human-readable for whoever launched the process
//!
//! # Usage
//!
//! ```rust,ignore
//! use stratum::logging;
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let guard = logging::init();
//! guard.set_level("debug");
//!
//! // Use tracing macros directly
//! tracing::info!(event_type = "app_start", "Application started");
//! ```
//!
//! Keystrokes observed by the hotstring engine are only ever logged at
//! `trace` level, so the default filter never writes typed text to disk.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

const LOG_FILE_NAME: &str = "stratum.jsonl";
const DEFAULT_FILTER: &str = "info,notify=warn";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    filter: reload::Handle<EnvFilter, Registry>,
    env_override: bool,
}

impl LoggingGuard {
    /// Swap the active filter for `level` (e.g. `logLevel` from settings.json).
    ///
    /// Ignored when `RUST_LOG` is set. Returns false if `level` does not parse.
    pub fn set_level(&self, level: &str) -> bool {
        if self.env_override {
            return false;
        }
        let filter = match EnvFilter::try_new(level) {
            Ok(filter) => filter,
            Err(e) => {
                tracing::warn!(level = %level, error = %e, "Invalid log level, keeping default");
                return false;
            }
        };
        match self.filter.reload(filter) {
            Ok(()) => {
                tracing::debug!(level = %level, "Log filter updated");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to update log filter");
                false
            }
        }
    }
}

/// Initialize the dual-output logging system.
///
/// Starts with `RUST_LOG` or the default filter so settings loading is
/// already logged; call [`LoggingGuard::set_level`] once the settings are
/// known. If the log file cannot be opened only stderr output is installed.
pub fn init() -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);

    let (env_filter, env_override) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(DEFAULT_FILTER), false),
    };
    let (filter_layer, filter) = reload::Layer::new(env_filter);

    let (json_layer, file_guard) = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => {
            // Non-blocking writer keeps file I/O off the hook and dispatch threads
            let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(true)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE);
            (Some(layer), Some(file_guard))
        }
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file {}: {}", log_path.display(), e);
            (None, None)
        }
    };

    // Compact layer for stderr
    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(json_layer)
        .with(pretty_layer)
        .init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Application logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
        filter,
        env_override,
    }
}

/// Get the log directory path (~/.stratum/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".stratum").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("stratum-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}
