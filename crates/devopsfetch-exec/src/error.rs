//! Error types for command execution.

use std::io;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started (missing binary, permissions)
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The program ran but exited unsuccessfully
    #[error("{program} exited with {}: {stderr}", describe_code(.code))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The program did not finish within the caller's timeout and was killed
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    /// Waiting on or talking to the child failed
    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    /// Name of the program the error is about.
    pub fn program(&self) -> &str {
        match self {
            Self::Spawn { program, .. }
            | Self::NonZeroExit { program, .. }
            | Self::TimedOut { program, .. }
            | Self::Io { program, .. } => program,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (killed by signal)".to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_display() {
        let err = CommandError::Spawn {
            program: "nginx".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert_eq!(err.to_string(), "failed to run nginx: No such file or directory");
        assert_eq!(err.program(), "nginx");
    }

    #[test]
    fn test_non_zero_exit_display() {
        let err = CommandError::NonZeroExit {
            program: "journalctl".to_string(),
            code: Some(1),
            stderr: "Failed to parse timestamp".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "journalctl exited with status 1: Failed to parse timestamp"
        );

        let signalled = CommandError::NonZeroExit {
            program: "last".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(signalled.to_string().contains("killed by signal"));
    }

    #[test]
    fn test_timed_out_display() {
        let err = CommandError::TimedOut {
            program: "docker".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "docker timed out after 5s");
    }
}
