//! devopsfetch probes - the query-and-normalize layer.
//!
//! Each probe reads one external source and reduces it to report rows from
//! `devopsfetch-core`:
//! - [`ports`] - listening sockets and per-port connection detail
//! - [`containers`] - container images and instances
//! - [`vhost`] - nginx `server_name` declarations
//! - [`users`] - login history and active sessions
//! - [`journal`] - journal entries inside a date window
//!
//! Probes never talk to the host directly. They depend on small traits
//! (`SocketTable`, `ProcessTable`, `ContainerRuntime`, `AccountDatabase`,
//! `SessionTable`, `CommandRunner`) whose OS-backed implementations live in
//! [`proc_net`], [`system`] and [`utmp`], so every probe can be driven by
//! fakes in tests.
//!
//! # Panic-Free Guarantees
//!
//! All production code in this crate follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Expected failures become placeholder rows or error strings
//! - Only unreadable OS tables surface as [`ProbeError`]

pub mod containers;
pub mod error;
pub mod journal;
pub mod ports;
pub mod proc_net;
pub mod system;
pub mod users;
pub mod utmp;
pub mod vhost;

pub use containers::{ContainerInventory, ContainerRuntime, DockerCli};
pub use error::{ProbeError, ProbeResult};
pub use journal::JournalQuery;
pub use ports::{PortInventory, ProcessOwner, ProcessTable, SocketTable};
pub use proc_net::ProcfsSocketTable;
pub use system::{account_name, PasswdAccounts, SysinfoProcessTable};
pub use users::{
    AccountDatabase, LoginHistory, RawSession, SessionInventory, SessionTable, SYSTEM_UID_RANGE,
};
pub use utmp::UtmpSessionTable;
pub use vhost::{parse_server_blocks, parse_server_names, VhostInventory};
