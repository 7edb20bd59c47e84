//! Diagnostic log file setup.
//!
//! Trace output goes to an append-only file and never to the terminal, so
//! report output on stdout stays clean. The devopsfetch crates log at `info`
//! by default. A valid, non-empty `RUST_LOG` replaces that default entirely,
//! so `RUST_LOG=devopsfetch_probe=debug` turns on probe debug output.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Log file name inside the state directory.
pub const LOG_FILE_NAME: &str = "devopsfetch.log";

/// Default `info` directives, one per workspace crate.
const DEFAULT_DIRECTIVES: &[&str] = &[
    "devopsfetch=info",
    "devopsfetch_core=info",
    "devopsfetch_exec=info",
    "devopsfetch_probe=info",
    "devopsfetch_cli=info",
];

// ============================================================================
// Log Location
// ============================================================================

/// `<state_dir>/devopsfetch`, falling back to `$HOME/.local/state/devopsfetch`.
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("state")))
        .map(|dir| dir.join("devopsfetch"))
}

/// The configured log file, else the default location.
pub fn log_path(config: &Config) -> Option<PathBuf> {
    config
        .log_file
        .clone()
        .or_else(|| default_log_dir().map(|dir| dir.join(LOG_FILE_NAME)))
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Failed to create log directory {parent:?}: {e}");
            return None;
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Failed to open log file {path:?}: {e}");
            None
        }
    }
}

// ============================================================================
// Subscriber
// ============================================================================

/// Filter built from `RUST_LOG`, or the `info` defaults when it is unset,
/// empty or unparsable.
fn env_filter() -> EnvFilter {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())
}

fn filter_from(env: Option<&str>) -> EnvFilter {
    env.map(str::trim)
        .filter(|spec| !spec.is_empty())
        .and_then(|spec| match EnvFilter::try_new(spec) {
            Ok(filter) => Some(filter),
            Err(e) => {
                eprintln!("Warning: Ignoring invalid {}: {e}", EnvFilter::DEFAULT_ENV);
                None
            }
        })
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES.join(",")))
}

/// Installs the global subscriber.
///
/// If no log file can be opened, logging is switched off; the report still
/// runs.
pub fn init(config: &Config) {
    let log_file = log_path(config).and_then(|path| open_log_file(&path));

    let installed = match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("off"))
            .try_init(),
    };

    if let Err(e) = installed {
        eprintln!("Warning: Failed to install logger: {e}");
    }
}

// ============================================================================
// Tests
// ============================================================================
