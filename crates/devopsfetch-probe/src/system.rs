//! Process table backed by `sysinfo` and account names from the C library.

use sysinfo::{Pid, ProcessRefreshKind, RefreshKind, System, UpdateKind};
use tracing::debug;

use crate::ports::{ProcessOwner, ProcessTable};
use crate::users::AccountDatabase;

/// Buffer size for `getpwuid_r` when `sysconf` gives no hint.
const PASSWD_BUFFER_DEFAULT: usize = 1024;

/// Largest buffer tried before giving up on an entry.
const PASSWD_BUFFER_MAX: usize = 1024 * 1024;

/// Resolves `uid` through `getpwuid_r(3)`.
///
/// Goes through NSS, so LDAP, SSSD and systemd-homed accounts resolve as
/// well as `/etc/passwd` entries.
#[cfg(unix)]
pub fn account_name(uid: u32) -> Option<String> {
    // SAFETY: sysconf has no preconditions.
    let hint = unsafe { libc::sysconf(libc::_SC_GETPW_R_SIZE_MAX) };
    let mut size = usize::try_from(hint)
        .ok()
        .filter(|&n| n > 0)
        .unwrap_or(PASSWD_BUFFER_DEFAULT);

    loop {
        let mut buf: Vec<libc::c_char> = vec![0; size];
        let mut entry = std::mem::MaybeUninit::<libc::passwd>::uninit();
        let mut found: *mut libc::passwd = std::ptr::null_mut();

        // SAFETY: every pointer refers to live storage owned by this frame and
        // `buf.len()` is the real capacity of `buf`. On success `found` points
        // at `entry`, whose strings live in `buf`.
        let rc = unsafe {
            libc::getpwuid_r(
                uid,
                entry.as_mut_ptr(),
                buf.as_mut_ptr(),
                buf.len(),
                &mut found,
            )
        };

        match rc {
            0 if found.is_null() => return None,
            0 => {
                // SAFETY: `found` is non-null and points at the filled-in
                // `entry`; `pw_name` is NUL-terminated inside `buf`.
                let name = unsafe {
                    let name = (*found).pw_name;
                    if name.is_null() {
                        return None;
                    }
                    std::ffi::CStr::from_ptr(name).to_string_lossy().into_owned()
                };
                return Some(name);
            }
            libc::EINTR => continue,
            libc::ERANGE if size < PASSWD_BUFFER_MAX => size *= 2,
            errno => {
                debug!(uid, errno, "Account lookup failed");
                return None;
            }
        }
    }
}

#[cfg(not(unix))]
pub fn account_name(_uid: u32) -> Option<String> {
    None
}

// ============================================================================
// Process Table
// ============================================================================

/// Snapshot of running processes with their owning users.
///
/// The snapshot is taken once at construction; a process that exits
/// afterwards still resolves, one started afterwards does not.
pub struct SysinfoProcessTable {
    system: System,
}

impl SysinfoProcessTable {
    /// Refreshes process names and user ids for every PID.
    pub fn snapshot() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::new()
                .with_processes(ProcessRefreshKind::new().with_user(UpdateKind::Always)),
        );

        debug!(processes = system.processes().len(), "Process table snapshot taken");

        Self { system }
    }
}

impl ProcessTable for SysinfoProcessTable {
    fn owner(&self, pid: u32) -> Option<ProcessOwner> {
        let process = self.system.process(Pid::from_u32(pid))?;
        let uid: u32 = **process.user_id()?;

        let user = account_name(uid).unwrap_or_else(|| uid.to_string());

        Some(ProcessOwner {
            user,
            name: process.name().to_string_lossy().into_owned(),
        })
    }
}

// ============================================================================
// Account Database
// ============================================================================

/// [`AccountDatabase`] over the system user database (`getpwuid_r`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswdAccounts;

impl PasswdAccounts {
    pub fn new() -> Self {
        Self
    }
}

impl AccountDatabase for PasswdAccounts {
    fn username(&self, uid: u32) -> Option<String> {
        account_name(uid)
    }
}
