//! User accounts, login history and active login sessions.
//!
//! Login history is per-row error capture: one failing `last` lookup becomes
//! an `Error: ...` cell and the listing carries on. Contrast with the port
//! inventory, which drops rows it cannot resolve.

use std::ops::RangeInclusive;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use devopsfetch_core::{ActiveSession, HistoricalLoginRecord, UserSessions, NO_RECENT_LOGIN};
use devopsfetch_exec::{CommandRunner, CommandSpec};
use tracing::{debug, warn};

use crate::error::ProbeResult;

/// UIDs treated as system accounts.
pub const SYSTEM_UID_RANGE: RangeInclusive<u32> = 0..=999;

/// Default login-history command.
pub const DEFAULT_LAST_PROGRAM: &str = "last";

// ============================================================================
// Data Sources
// ============================================================================

/// OS account database lookup.
pub trait AccountDatabase {
    fn username(&self, uid: u32) -> Option<String>;
}

/// One login record from the OS session table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSession {
    pub username: String,
    pub terminal: String,
    /// Session start, seconds since the Unix epoch
    pub started: i64,
}

/// OS table of currently logged-in sessions.
pub trait SessionTable {
    fn sessions(&self) -> ProbeResult<Vec<RawSession>>;
}

// ============================================================================
// Login History
// ============================================================================

/// Most recent login per system account, via `last -n 1 <user>`.
pub struct LoginHistory<A, R> {
    accounts: A,
    runner: R,
    program: String,
    timeout: Option<Duration>,
}

impl<A: AccountDatabase, R: CommandRunner> LoginHistory<A, R> {
    pub fn new(accounts: A, runner: R) -> Self {
        Self {
            accounts,
            runner,
            program: DEFAULT_LAST_PROGRAM.to_string(),
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

    /// One record per account in [`SYSTEM_UID_RANGE`], in UID order.
    pub fn list_system_accounts(&self) -> Vec<HistoricalLoginRecord> {
        let records: Vec<HistoricalLoginRecord> = SYSTEM_UID_RANGE
            .filter_map(|uid| self.accounts.username(uid))
            .map(|username| {
                let last_login = self.last_login(&username);
                HistoricalLoginRecord {
                    username,
                    last_login,
                }
            })
            .collect();

        debug!(accounts = records.len(), "Login history complete");
        records
    }

    fn last_login(&self, username: &str) -> String {
        let spec = CommandSpec::new(&self.program)
            .args(["-n", "1", username])
            .timeout(self.timeout);

        let result = self
            .runner
            .run(&spec)
            .and_then(|output| output.into_success(&self.program));

        match result {
            Ok(stdout) => {
                let text = stdout.trim();
                if text.is_empty() {
                    NO_RECENT_LOGIN.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                warn!(user = username, error = %e, "Login history lookup failed");
                format!("Error: {e}")
            }
        }
    }
}

// ============================================================================
// Active Sessions
// ============================================================================

/// Currently logged-in sessions with their elapsed time.
pub struct SessionInventory<S> {
    table: S,
}

impl<S: SessionTable> SessionInventory<S> {
    pub fn new(table: S) -> Self {
        Self { table }
    }

    /// Every active session, durations measured against `now`.
    pub fn active_sessions(&self, now: DateTime<Local>) -> ProbeResult<Vec<ActiveSession>> {
        let sessions: Vec<ActiveSession> = self
            .table
            .sessions()?
            .into_iter()
            .filter_map(|raw| observe(raw, now))
            .collect();

        debug!(sessions = sessions.len(), "Active sessions read");
        Ok(sessions)
    }

    /// Sessions of exactly `username`; none is reported, not an error.
    pub fn sessions_for_user(
        &self,
        username: &str,
        now: DateTime<Local>,
    ) -> ProbeResult<UserSessions> {
        let sessions: Vec<ActiveSession> = self
            .active_sessions(now)?
            .into_iter()
            .filter(|s| s.username == username)
            .collect();

        if sessions.is_empty() {
            debug!(user = username, "User has no active session");
            Ok(UserSessions::NotLoggedIn {
                username: username.to_string(),
            })
        } else {
            Ok(UserSessions::Sessions { sessions })
        }
    }
}

fn observe(raw: RawSession, now: DateTime<Local>) -> Option<ActiveSession> {
    match Local.timestamp_opt(raw.started, 0).single() {
        Some(login_time) => Some(ActiveSession::observed(
            raw.username,
            raw.terminal,
            login_time,
            now,
        )),
        None => {
            warn!(user = %raw.username, started = raw.started, "Session start time out of range, skipping");
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use devopsfetch_exec::{CommandError, CommandOutput};
    use std::collections::BTreeMap;

    struct Accounts(BTreeMap<u32, String>);

    impl AccountDatabase for Accounts {
        fn username(&self, uid: u32) -> Option<String> {
            self.0.get(&uid).cloned()
        }
    }

    fn accounts(entries: &[(u32, &str)]) -> Accounts {
        Accounts(entries.iter().map(|(u, n)| (*u, n.to_string())).collect())
    }

    struct Sessions(Vec<RawSession>);

    impl SessionTable for Sessions {
        fn sessions(&self) -> ProbeResult<Vec<RawSession>> {
            Ok(self.0.clone())
        }
    }

    fn raw(user: &str, tty: &str, started: i64) -> RawSession {
        RawSession {
            username: user.to_string(),
            terminal: tty.to_string(),
            started,
        }
    }

    fn now_at(epoch: i64) -> DateTime<Local> {
        Local.timestamp_opt(epoch, 0).single().unwrap()
    }

    #[test]
    fn test_accounts_outside_system_range_ignored() {
        let runner = |_: &CommandSpec| -> Result<CommandOutput, CommandError> {
            Ok(CommandOutput::success("pts/0 login\n"))
        };
        let history = LoginHistory::new(accounts(&[(0, "root"), (999, "svc"), (1000, "alice")]), runner);
        let names: Vec<String> = history
            .list_system_accounts()
            .into_iter()
            .map(|r| r.username)
            .collect();
        assert_eq!(names, vec!["root", "svc"]);
    }

    #[test]
    fn test_empty_history_becomes_placeholder() {
        let runner = |_: &CommandSpec| -> Result<CommandOutput, CommandError> {
            Ok(CommandOutput::success("  \n"))
        };
        let records = LoginHistory::new(accounts(&[(1, "daemon")]), runner).list_system_accounts();
        assert_eq!(records[0].last_login, NO_RECENT_LOGIN);
    }

    #[test]
    fn test_last_invoked_per_user() {
        let runner = |spec: &CommandSpec| -> Result<CommandOutput, CommandError> {
            assert_eq!(spec.program, "last");
            assert_eq!(spec.args[..2], ["-n".to_string(), "1".to_string()]);
            Ok(CommandOutput::success(format!("{} pts/1 Mon", spec.args[2])))
        };
        let records = LoginHistory::new(accounts(&[(0, "root")]), runner).list_system_accounts();
        assert_eq!(records[0].last_login, "root pts/1 Mon");
    }

    #[test]
    fn test_lookup_error_is_captured_per_row() {
        let runner = |spec: &CommandSpec| -> Result<CommandOutput, CommandError> {
            if spec.args.last().map(String::as_str) == Some("bin") {
                Err(CommandError::Spawn {
                    program: "last".into(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                })
            } else {
                Ok(CommandOutput::success("ok"))
            }
        };
        let records =
            LoginHistory::new(accounts(&[(0, "root"), (2, "bin"), (3, "sys")]), runner).list_system_accounts();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].last_login, "ok");
        assert!(records[1].last_login.starts_with("Error: "));
        assert_eq!(records[2].last_login, "ok");
    }

    #[test]
    fn test_non_zero_exit_is_captured_per_row() {
        let runner = |_: &CommandSpec| -> Result<CommandOutput, CommandError> {
            Ok(CommandOutput::failure(1, "cannot open /var/log/wtmp"))
        };
        let records = LoginHistory::new(accounts(&[(0, "root")]), runner)
            .with_program("/usr/bin/last")
            .list_system_accounts();
        assert!(records[0].last_login.contains("cannot open /var/log/wtmp"));
    }

    #[test]
    fn test_active_sessions_durations() {
        let start = 1_700_000_000;
        let inventory = SessionInventory::new(Sessions(vec![
            raw("alice", "pts/0", start),
            raw("bob", "tty1", start + 3_600),
        ]));
        let sessions = inventory.active_sessions(now_at(start + 7_265)).unwrap();

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].duration.format(), "2:01:05");
        assert_eq!(sessions[1].duration.format(), "1:01:05");
        assert_eq!(sessions[1].terminal, "tty1");
    }

    #[test]
    fn test_sessions_for_user_not_logged_in() {
        let inventory = SessionInventory::new(Sessions(vec![raw("alice", "pts/0", 0)]));
        let result = inventory.sessions_for_user("nouser", now_at(10)).unwrap();
        assert_eq!(
            result,
            UserSessions::NotLoggedIn {
                username: "nouser".into()
            }
        );
    }

    #[test]
    fn test_sessions_for_user_multiple_terminals() {
        let inventory = SessionInventory::new(Sessions(vec![
            raw("alice", "pts/0", 100),
            raw("bob", "pts/1", 100),
            raw("alice", "pts/2", 200),
        ]));
        match inventory.sessions_for_user("alice", now_at(300)).unwrap() {
            UserSessions::Sessions { sessions } => {
                let ttys: Vec<&str> = sessions.iter().map(|s| s.terminal.as_str()).collect();
                assert_eq!(ttys, vec!["pts/0", "pts/2"]);
            }
            other => panic!("expected sessions, got {other:?}"),
        }
    }

    #[test]
    fn test_username_match_is_exact() {
        let inventory = SessionInventory::new(Sessions(vec![raw("alice2", "pts/0", 0)]));
        let result = inventory.sessions_for_user("alice", now_at(1)).unwrap();
        assert!(matches!(result, UserSessions::NotLoggedIn { .. }));
    }
}
