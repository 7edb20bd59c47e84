//! Listening-port inventory rows.

use serde::Serialize;
use std::fmt;
use std::net::SocketAddr;

/// One listening socket with a resolved owning process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortRecord {
    pub port: u16,
    pub owning_user: String,
    pub service_name: String,
}

/// Address family of an inet socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddressFamily {
    #[serde(rename = "AF_INET")]
    Inet,
    #[serde(rename = "AF_INET6")]
    Inet6,
}

impl AddressFamily {
    /// Family of the given local address.
    pub fn of(addr: &SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(_) => Self::Inet,
            SocketAddr::V6(_) => Self::Inet6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inet => "AF_INET",
            Self::Inet6 => "AF_INET6",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Socket type: stream (TCP) or datagram (UDP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SocketType {
    #[serde(rename = "SOCK_STREAM")]
    Stream,
    #[serde(rename = "SOCK_DGRAM")]
    Datagram,
}

impl SocketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stream => "SOCK_STREAM",
            Self::Datagram => "SOCK_DGRAM",
        }
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kernel connection state.
///
/// Datagram sockets carry no TCP state and report [`ConnectionStatus::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Established,
    SynSent,
    SynRecv,
    #[serde(rename = "FIN_WAIT1")]
    FinWait1,
    #[serde(rename = "FIN_WAIT2")]
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Listen,
    Closing,
    None,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Established => "ESTABLISHED",
            Self::SynSent => "SYN_SENT",
            Self::SynRecv => "SYN_RECV",
            Self::FinWait1 => "FIN_WAIT1",
            Self::FinWait2 => "FIN_WAIT2",
            Self::TimeWait => "TIME_WAIT",
            Self::Close => "CLOSE",
            Self::CloseWait => "CLOSE_WAIT",
            Self::LastAck => "LAST_ACK",
            Self::Listen => "LISTEN",
            Self::Closing => "CLOSING",
            Self::None => "NONE",
        }
    }

    #[must_use]
    pub fn is_listen(&self) -> bool {
        matches!(self, Self::Listen)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One kernel connection on a specific local port, shown verbatim.
///
/// `fd` and `pid` stay empty when the socket inode could not be matched to a
/// process (other users' processes without privileges, sockets in TIME_WAIT).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortDetail {
    pub fd: Option<i32>,
    pub family: AddressFamily,
    pub socket_type: SocketType,
    pub local_address: SocketAddr,
    pub remote_address: Option<SocketAddr>,
    pub status: ConnectionStatus,
    pub pid: Option<u32>,
}

impl PortDetail {
    /// Local port of the connection.
    pub fn port(&self) -> u16 {
        self.local_address.port()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_family_of() {
        let v4: SocketAddr = "127.0.0.1:80".parse().unwrap();
        let v6: SocketAddr = "[::1]:80".parse().unwrap();
        assert_eq!(AddressFamily::of(&v4), AddressFamily::Inet);
        assert_eq!(AddressFamily::of(&v6), AddressFamily::Inet6);
    }

    #[test]
    fn test_connection_status_serializes_kernel_names() {
        let json = serde_json::to_string(&ConnectionStatus::FinWait1).unwrap();
        assert_eq!(json, "\"FIN_WAIT1\"");
        let json = serde_json::to_string(&ConnectionStatus::CloseWait).unwrap();
        assert_eq!(json, "\"CLOSE_WAIT\"");
        assert_eq!(ConnectionStatus::Listen.to_string(), "LISTEN");
    }

    #[test]
    fn test_port_detail_port() {
        let detail = PortDetail {
            fd: None,
            family: AddressFamily::Inet,
            socket_type: SocketType::Stream,
            local_address: "0.0.0.0:8080".parse().unwrap(),
            remote_address: None,
            status: ConnectionStatus::Listen,
            pid: None,
        };
        assert_eq!(detail.port(), 8080);
        assert!(detail.status.is_listen());
    }
}
