//! Kernel socket table read from `/proc/net`.
//!
//! Connections come from `/proc/net/{tcp,tcp6,udp,udp6}`. Owning PIDs are
//! found by walking `/proc/<pid>/fd` for `socket:[inode]` links; processes
//! whose fd directory we may not read simply contribute no owners.

use std::collections::HashMap;
use std::net::SocketAddr;

use devopsfetch_core::{AddressFamily, ConnectionStatus, PortDetail, SocketType};
use procfs::net::{TcpNetEntry, TcpState, UdpNetEntry};
use procfs::process::FDTarget;
use procfs::{ProcError, ProcResult};
use tracing::{debug, warn};

use crate::error::{ProbeError, ProbeResult};
use crate::ports::SocketTable;

/// PID and descriptor number holding a socket inode.
#[derive(Debug, Clone, Copy)]
struct SocketHolder {
    pid: u32,
    fd: i32,
}

/// [`SocketTable`] backed by procfs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcfsSocketTable;

impl ProcfsSocketTable {
    pub fn new() -> Self {
        Self
    }
}

impl SocketTable for ProcfsSocketTable {
    fn connections(&self) -> ProbeResult<Vec<PortDetail>> {
        let holders = socket_holders();
        let mut rows = Vec::new();

        for entry in read_table("tcp", procfs::net::tcp())? {
            rows.push(tcp_row(&entry, &holders));
        }
        for entry in read_table("tcp6", procfs::net::tcp6())? {
            rows.push(tcp_row(&entry, &holders));
        }
        for entry in read_table("udp", procfs::net::udp())? {
            rows.push(udp_row(&entry, &holders));
        }
        for entry in read_table("udp6", procfs::net::udp6())? {
            rows.push(udp_row(&entry, &holders));
        }

        debug!(connections = rows.len(), owned_inodes = holders.len(), "Read socket table");
        Ok(rows)
    }
}

/// Unwraps one `/proc/net` table. A missing table (IPv6 disabled) is empty.
fn read_table<T>(name: &str, result: ProcResult<Vec<T>>) -> ProbeResult<Vec<T>> {
    match result {
        Ok(entries) => Ok(entries),
        Err(ProcError::NotFound(_)) => {
            debug!(table = name, "Socket table not present, skipping");
            Ok(Vec::new())
        }
        Err(e) => Err(ProbeError::SocketTable(format!("/proc/net/{name}: {e}"))),
    }
}

/// Maps socket inodes to the first process/fd found holding them.
fn socket_holders() -> HashMap<u64, SocketHolder> {
    let mut holders = HashMap::new();

    let processes = match procfs::process::all_processes() {
        Ok(processes) => processes,
        Err(e) => {
            warn!(error = %e, "Failed to enumerate processes, socket owners unknown");
            return holders;
        }
    };

    for process in processes.flatten() {
        let Ok(pid) = u32::try_from(process.pid()) else {
            continue;
        };
        // Permission denied for other users' processes unless privileged
        let Ok(fds) = process.fd() else {
            continue;
        };
        for info in fds.flatten() {
            if let FDTarget::Socket(inode) = info.target {
                holders
                    .entry(inode)
                    .or_insert(SocketHolder { pid, fd: info.fd });
            }
        }
    }

    holders
}

fn tcp_row(entry: &TcpNetEntry, holders: &HashMap<u64, SocketHolder>) -> PortDetail {
    connection_row(
        SocketType::Stream,
        entry.local_address,
        entry.remote_address,
        tcp_status(&entry.state),
        holder(entry.inode, holders),
    )
}

fn udp_row(entry: &UdpNetEntry, holders: &HashMap<u64, SocketHolder>) -> PortDetail {
    connection_row(
        SocketType::Datagram,
        entry.local_address,
        entry.remote_address,
        ConnectionStatus::None,
        holder(entry.inode, holders),
    )
}

fn connection_row(
    socket_type: SocketType,
    local_address: SocketAddr,
    remote_address: SocketAddr,
    status: ConnectionStatus,
    holder: Option<SocketHolder>,
) -> PortDetail {
    PortDetail {
        fd: holder.map(|h| h.fd),
        family: AddressFamily::of(&local_address),
        socket_type,
        local_address,
        remote_address: connected_peer(remote_address),
        status,
        pid: holder.map(|h| h.pid),
    }
}

/// Inode 0 marks sockets no longer attached to any file (e.g. TIME_WAIT).
fn holder(inode: u64, holders: &HashMap<u64, SocketHolder>) -> Option<SocketHolder> {
    if inode == 0 {
        return None;
    }
    holders.get(&inode).copied()
}

/// An unconnected socket reports `0.0.0.0:0` / `[::]:0` as its peer.
fn connected_peer(addr: SocketAddr) -> Option<SocketAddr> {
    if addr.port() == 0 && addr.ip().is_unspecified() {
        None
    } else {
        Some(addr)
    }
}

fn tcp_status(state: &TcpState) -> ConnectionStatus {
    match state {
        TcpState::Established => ConnectionStatus::Established,
        TcpState::SynSent => ConnectionStatus::SynSent,
        TcpState::SynRecv | TcpState::NewSynRecv => ConnectionStatus::SynRecv,
        TcpState::FinWait1 => ConnectionStatus::FinWait1,
        TcpState::FinWait2 => ConnectionStatus::FinWait2,
        TcpState::TimeWait => ConnectionStatus::TimeWait,
        TcpState::Close => ConnectionStatus::Close,
        TcpState::CloseWait => ConnectionStatus::CloseWait,
        TcpState::LastAck => ConnectionStatus::LastAck,
        TcpState::Listen => ConnectionStatus::Listen,
        TcpState::Closing => ConnectionStatus::Closing,
    }
}
