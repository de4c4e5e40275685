//! Tracing subscriber setup.
//!
//! The TUI owns the terminal, so in TUI mode log lines go to a file in the
//! system temp directory. Headless commands log to stderr, leaving stdout
//! to the event stream.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LEVEL: &str = "warn";

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to [`log_file_path`].
    File,
    Stderr,
}

/// The log file used in TUI mode.
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("gta.log")
}

/// Install the global subscriber.
///
/// Uses the `RUST_LOG` environment variable if set, otherwise falls back
/// to [`DEFAULT_LEVEL`]. Subsequent calls are no-ops. If the log file
/// cannot be opened, logging stays disabled rather than falling back to
/// the terminal.
pub fn init_logging(target: LogTarget) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    match target {
        LogTarget::File => {
            let Ok(file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file_path())
            else {
                return;
            };
            fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .try_init()
                .ok();
        }
        LogTarget::Stderr => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .try_init()
                .ok();
        }
    }

    tracing::debug!(?target, "logging initialised");
}
