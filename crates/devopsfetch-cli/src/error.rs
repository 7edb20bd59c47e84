//! Error types for the devopsfetch front end.
//!
//! Only failures that should stop the run live here. Expected probe
//! failures (a missing `nginx`, a docker daemon that is down) are turned
//! into printable `Error: ...` text by the report layer and never reach
//! [`CliError`].

use std::io;
use std::path::PathBuf;

use devopsfetch_probe::ProbeError;
use thiserror::Error;

// ============================================================================
// CLI Error Type
// ============================================================================

/// Errors that abort a devopsfetch run.
#[derive(Error, Debug)]
pub enum CliError {
    /// The configuration file exists (or was named explicitly) but could
    /// not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid TOML or has unknown keys.
    #[error("Invalid config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An OS table (`/proc`, utmp) could not be read.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Report rows could not be serialized for `--json`.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

// ============================================================================
// Tests
// ============================================================================
