//! devopsfetch core - report row types shared by the probes and the CLI.
//!
//! Every type in this crate is a read-only snapshot: built once per query,
//! rendered, then dropped. Nothing here touches the host.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod container;
pub mod error;
pub mod port;
pub mod session;
pub mod vhost;
pub mod window;

// Re-exports for convenience
pub use container::{ContainerImage, ContainerInstance, ContainerReport, ContainerStatus};
pub use error::{DomainError, DomainResult};
pub use port::{AddressFamily, ConnectionStatus, PortDetail, PortRecord, SocketType};
pub use session::{
    ActiveSession, HistoricalLoginRecord, SessionDuration, UserSessions, NO_RECENT_LOGIN,
};
pub use vhost::{Domain, DomainDetail, ServerBlock};
pub use window::{LogWindow, LogWindowResult, NO_ENTRIES};
