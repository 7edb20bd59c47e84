//! Error types for host probes.

use devopsfetch_exec::CommandError;
use thiserror::Error;

/// Errors a probe returns instead of a report.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// An external command could not be run or failed
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The kernel socket table could not be read
    #[error("failed to read socket table: {0}")]
    SocketTable(String),

    /// The login session table could not be read
    #[error("failed to read session table: {0}")]
    SessionTable(String),

    /// A command printed something the probe cannot interpret
    #[error("unexpected output from {program}: {line:?}")]
    UnexpectedOutput { program: String, line: String },
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;
