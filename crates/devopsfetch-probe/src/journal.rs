//! System journal activity inside a calendar-date window.

use std::time::Duration;

use devopsfetch_core::{LogWindow, LogWindowResult};
use devopsfetch_exec::{CommandRunner, CommandSpec};
use tracing::{debug, error, info, trace};

/// Default journal query binary.
pub const DEFAULT_JOURNALCTL_PROGRAM: &str = "journalctl";

/// Queries the journal for `[start, end + 1 day)`.
///
/// Every outcome is a printable [`LogWindowResult`]; nothing escapes as an
/// error.
pub struct JournalQuery<R> {
    runner: R,
    program: String,
    timeout: Option<Duration>,
}

impl<R: CommandRunner> JournalQuery<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            program: DEFAULT_JOURNALCTL_PROGRAM.to_string(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Journal entries between two `YYYY-MM-DD` dates, end date included.
    ///
    /// Bad dates return a parse-error result without running the journal.
    pub fn activity(&self, start: &str, end: &str) -> LogWindowResult {
        let window = match LogWindow::parse(start, end) {
            Ok(window) => window,
            Err(e) => {
                error!(start, end, error = %e, "Timestamp parsing error");
                return LogWindowResult::parse_error(start, end);
            }
        };

        let spec = CommandSpec::new(&self.program)
            .arg("--since")
            .arg(window.since_arg())
            .arg("--until")
            .arg(window.until_arg())
            .arg("--no-pager")
            .timeout(self.timeout);

        info!(command = %spec, window = %window, "Running journal query");

        let result = self
            .runner
            .run(&spec)
            .and_then(|output| output.into_success(&self.program));

        match result {
            Ok(stdout) => {
                debug!(bytes = stdout.len(), "Journal query finished");
                trace!(output = %stdout, "Journal output");
                LogWindowResult::from_output(&stdout)
            }
            Err(e) => {
                error!(command = %spec, error = %e, "Journal query failed");
                LogWindowResult::retrieval_error()
            }
        }
    }
}
