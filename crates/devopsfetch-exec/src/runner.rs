//! The command runner capability and its process-spawning implementation.

use std::fmt;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CommandError;

// ============================================================================
// Command Description
// ============================================================================

/// A command to run: program, argv, optional stdin and timeout.
///
/// Arguments are passed as argv, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Display for CommandSpec {
    /// Shell-like rendering for logs. Arguments containing spaces are quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Command Output
// ============================================================================

/// Captured result of a command that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Output of a successful run.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Output of a run that exited with `code`.
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Returns stdout if the command exited with status 0.
    pub fn into_success(self, program: &str) -> Result<String, CommandError> {
        if self.is_success() {
            Ok(self.stdout)
        } else {
            Err(CommandError::NonZeroExit {
                program: program.to_string(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }

    fn from_parts(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            code: status.code(),
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }
}

// ============================================================================
// Runner Trait
// ============================================================================

/// Runs external commands on behalf of a probe.
///
/// Implemented for [`SystemRunner`] and for any
/// `Fn(&CommandSpec) -> Result<CommandOutput, CommandError>`, so tests can
/// pass a closure.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

impl<F> CommandRunner for F
where
    F: Fn(&CommandSpec) -> Result<CommandOutput, CommandError>,
{
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        self(spec)
    }
}

// ============================================================================
// System Runner
// ============================================================================

/// Spawns real processes with `tokio::process::Command`.
///
/// stdin is null unless the [`CommandSpec`] provides input; stdout and stderr
/// are captured. Input is written while both pipes are read, so a child that
/// answers before consuming its input cannot stall the run. A timeout bounds
/// the whole exchange: on expiry the child is killed and
/// [`CommandError::TimedOut`] is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        debug!(command = %spec, timeout = ?spec.timeout, "Running command");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| io_error(spec, e))?;
        let output = runtime.block_on(run_child(spec))?;

        debug!(
            program = %spec.program,
            code = ?output.code,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "Command finished"
        );

        Ok(output)
    }
}

async fn run_child(spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CommandError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

    let pipe = child.stdin.take();
    let feed = async move {
        if let (Some(input), Some(mut pipe)) = (spec.stdin.as_deref(), pipe) {
            match pipe.write_all(input.as_bytes()).await {
                Ok(()) => {}
                // Child exited without reading its input
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    };
    let exchange = async move {
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        fed?;
        Ok::<_, io::Error>(output)
    };

    let output = match spec.timeout {
        None => exchange.await,
        // Dropping the exchange drops the child, which kills it
        Some(timeout) => match tokio::time::timeout(timeout, exchange).await {
            Ok(output) => output,
            Err(_) => {
                warn!(program = %spec.program, timeout_secs = timeout.as_secs(), "Command timed out, killing");
                return Err(CommandError::TimedOut {
                    program: spec.program.clone(),
                    timeout,
                });
            }
        },
    }
    .map_err(|e| io_error(spec, e))?;

    Ok(CommandOutput::from_parts(
        output.status,
        &output.stdout,
        &output.stderr,
    ))
}

fn io_error(spec: &CommandSpec, source: io::Error) -> CommandError {
    CommandError::Io {
        program: spec.program.clone(),
        source,
    }
}

// ============================================================================
// Tests
// ============================================================================
