//! Login session and login-history rows.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;

/// Placeholder used when the login-history command printed nothing.
pub const NO_RECENT_LOGIN: &str = "No recent login";

/// Timestamp layout used for login times in reports.
pub const LOGIN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Elapsed time of a session in whole seconds.
///
/// Never negative: a start time in the future (clock skew) clamps to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct SessionDuration {
    seconds: u64,
}

impl SessionDuration {
    pub fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    /// Time from `started` to `now`, truncated to whole seconds.
    pub fn between(started: DateTime<Local>, now: DateTime<Local>) -> Self {
        let seconds = (now - started).num_seconds().max(0) as u64;
        Self { seconds }
    }

    pub fn as_secs(&self) -> u64 {
        self.seconds
    }

    /// Formats as `H:MM:SS`, prefixed with `N day(s), ` past 24 hours.
    pub fn format(&self) -> String {
        let days = self.seconds / 86_400;
        let rem = self.seconds % 86_400;
        let clock = format!("{}:{:02}:{:02}", rem / 3600, (rem % 3600) / 60, rem % 60);
        match days {
            0 => clock,
            1 => format!("1 day, {clock}"),
            n => format!("{n} days, {clock}"),
        }
    }
}

impl fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// A user currently logged in on a terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveSession {
    pub username: String,
    pub terminal: String,
    pub login_time: DateTime<Local>,
    pub duration: SessionDuration,
}

impl ActiveSession {
    /// Builds a session snapshot as observed at `now`.
    pub fn observed(
        username: impl Into<String>,
        terminal: impl Into<String>,
        login_time: DateTime<Local>,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            username: username.into(),
            terminal: terminal.into(),
            login_time,
            duration: SessionDuration::between(login_time, now),
        }
    }

    /// Login time in report layout.
    pub fn login_time_display(&self) -> String {
        self.login_time.format(LOGIN_TIME_FORMAT).to_string()
    }
}

/// Most recent login of a system account, as free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoricalLoginRecord {
    pub username: String,
    pub last_login: String,
}

/// Answer to "what sessions does this user have?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserSessions {
    NotLoggedIn { username: String },
    Sessions { sessions: Vec<ActiveSession> },
}

impl UserSessions {
    /// Message shown when the user has no active session.
    pub fn not_logged_in_message(username: &str) -> String {
        format!("User {username} is not currently logged in.")
    }
}
