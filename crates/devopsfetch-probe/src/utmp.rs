//! Session table read from the utmp database.

use tracing::debug;

use crate::error::ProbeResult;
use crate::users::{RawSession, SessionTable};

/// [`SessionTable`] over `USER_PROCESS` records from `getutxent(3)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtmpSessionTable;

impl UtmpSessionTable {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
impl SessionTable for UtmpSessionTable {
    fn sessions(&self) -> ProbeResult<Vec<RawSession>> {
        let mut sessions = Vec::new();

        // SAFETY: the utmpx cursor is process-global and this is its only
        // user. Each record returned by getutxent is copied out before the
        // next call overwrites it, and endutxent closes the database.
        unsafe {
            libc::setutxent();
            loop {
                let entry = libc::getutxent();
                if entry.is_null() {
                    break;
                }
                let entry = &*entry;
                if entry.ut_type != libc::USER_PROCESS {
                    continue;
                }
                sessions.push(RawSession {
                    username: c_field(&entry.ut_user),
                    terminal: c_field(&entry.ut_line),
                    started: i64::from(entry.ut_tv.tv_sec),
                });
            }
            libc::endutxent();
        }

        debug!(sessions = sessions.len(), "Read utmp session table");
        Ok(sessions)
    }
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
impl SessionTable for UtmpSessionTable {
    fn sessions(&self) -> ProbeResult<Vec<RawSession>> {
        Err(crate::error::ProbeError::SessionTable(
            "utmp session table is only supported on Linux with glibc".to_string(),
        ))
    }
}

/// Fixed-size, NUL-padded utmp text field to `String`.
#[cfg_attr(not(all(target_os = "linux", target_env = "gnu")), allow(dead_code))]
fn c_field(field: &[libc::c_char]) -> String {
    let bytes: Vec<u8> = field
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
