//! Port inventory: listening sockets and per-port connection detail.
//!
//! Two row policies live here and must stay distinct:
//! - [`PortInventory::list_ports`] drops a listening socket whose owning
//!   process cannot be resolved (exited, or not ours to inspect). No partial
//!   row is emitted.
//! - [`PortInventory::port_detail`] shows every connection verbatim, with
//!   `fd`/`pid` left empty when unknown.

use devopsfetch_core::{PortDetail, PortRecord};
use tracing::{debug, trace};

use crate::error::ProbeResult;

// ============================================================================
// Data Sources
// ============================================================================

/// Kernel inet connection table.
///
/// Rows are returned in kernel enumeration order with `fd`/`pid` filled in
/// where the socket inode could be matched to a process.
pub trait SocketTable {
    fn connections(&self) -> ProbeResult<Vec<PortDetail>>;
}

/// User and executable name of a running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOwner {
    pub user: String,
    pub name: String,
}

/// Process table lookup by PID.
pub trait ProcessTable {
    /// Returns `None` if the process no longer exists or cannot be inspected.
    fn owner(&self, pid: u32) -> Option<ProcessOwner>;
}

// ============================================================================
// Port Inventory
// ============================================================================

/// Lists listening ports with their owners.
pub struct PortInventory<S, P> {
    sockets: S,
    processes: P,
}

impl<S: SocketTable, P: ProcessTable> PortInventory<S, P> {
    pub fn new(sockets: S, processes: P) -> Self {
        Self { sockets, processes }
    }

    /// One record per LISTEN socket whose owning process resolves.
    ///
    /// Order follows the socket table; a port bound on both IPv4 and IPv6
    /// appears once per socket.
    pub fn list_ports(&self) -> ProbeResult<Vec<PortRecord>> {
        let connections = self.sockets.connections()?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for conn in connections.iter().filter(|c| c.status.is_listen()) {
            let owner = conn.pid.and_then(|pid| self.processes.owner(pid));
            match owner {
                Some(owner) => records.push(PortRecord {
                    port: conn.port(),
                    owning_user: owner.user,
                    service_name: owner.name,
                }),
                None => {
                    trace!(port = conn.port(), pid = ?conn.pid, "Owner not resolvable, skipping socket");
                    skipped += 1;
                }
            }
        }

        debug!(listening = records.len(), skipped, "Port inventory complete");
        Ok(records)
    }

    /// Every connection, in any state, whose local port is `port`.
    ///
    /// An unused port yields an empty list.
    pub fn port_detail(&self, port: u16) -> ProbeResult<Vec<PortDetail>> {
        let rows: Vec<PortDetail> = self
            .sockets
            .connections()?
            .into_iter()
            .filter(|c| c.port() == port)
            .collect();

        debug!(port, matches = rows.len(), "Port detail complete");
        Ok(rows)
    }
}

// ============================================================================
// Tests
// ============================================================================
