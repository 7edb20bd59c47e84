//! Calendar-date windows for journal queries.

use crate::error::{DomainError, DomainResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// Input layout for window bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Layout handed to the journal's `--since`/`--until`.
pub const BOUND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sentinel returned when the journal query succeeded but matched nothing.
pub const NO_ENTRIES: &str = "-- No entries --";

/// Half-open time window `[since, until)` built from two calendar dates.
///
/// The end date is inclusive: `until` is midnight of the day after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogWindow {
    since: NaiveDateTime,
    until: NaiveDateTime,
}

impl LogWindow {
    /// Parses `start` and `end` as `YYYY-MM-DD` dates.
    ///
    /// No ordering check is made between the two; an inverted window is
    /// passed through and the journal decides what it means.
    pub fn parse(start: &str, end: &str) -> DomainResult<Self> {
        let start_date = parse_date(start)?;
        let end_date = parse_date(end)?;

        let next_day = end_date
            .succ_opt()
            .ok_or_else(|| DomainError::DateOutOfRange {
                value: end.to_string(),
            })?;

        Ok(Self {
            since: midnight(start_date, start)?,
            until: midnight(next_day, end)?,
        })
    }

    pub fn since(&self) -> NaiveDateTime {
        self.since
    }

    pub fn until(&self) -> NaiveDateTime {
        self.until
    }

    /// `since` in journal bound layout.
    pub fn since_arg(&self) -> String {
        self.since.format(BOUND_FORMAT).to_string()
    }

    /// `until` in journal bound layout.
    pub fn until_arg(&self) -> String {
        self.until.format(BOUND_FORMAT).to_string()
    }

    /// True if `timestamp` falls inside the window.
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.since <= timestamp && timestamp < self.until
    }
}

impl fmt::Display for LogWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.since_arg(), self.until_arg())
    }
}

fn parse_date(value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| DomainError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn midnight(date: NaiveDate, original: &str) -> DomainResult<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| DomainError::DateOutOfRange {
            value: original.to_string(),
        })
}

/// Outcome of a journal window query, always printable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum LogWindowResult {
    /// Raw journal text
    Entries(String),
    /// The query ran and matched nothing
    NoEntries,
    /// Bad input or the query could not be run
    Error(String),
}

impl LogWindowResult {
    pub fn parse_error(start: &str, end: &str) -> Self {
        Self::Error(format!(
            "Error: Failed to parse timestamps: {start}, {end}"
        ))
    }

    pub fn retrieval_error() -> Self {
        Self::Error(
            "Error: Failed to retrieve journal logs for the given time range.".to_string(),
        )
    }

    /// Text for output that was captured successfully.
    pub fn from_output(output: &str) -> Self {
        let trimmed = output.trim();
        if trimmed.is_empty() {
            Self::NoEntries
        } else {
            Self::Entries(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for LogWindowResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entries(text) => f.write_str(text),
            Self::NoEntries => f.write_str(NO_ENTRIES),
            Self::Error(message) => f.write_str(message),
        }
    }
}
