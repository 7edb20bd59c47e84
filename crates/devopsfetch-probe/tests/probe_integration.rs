//! Integration tests for the probes, driven through the public API with
//! fake OS tables and fake command runners.
//!
//! Tests CAN use `.unwrap()` and `.expect()`.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{Local, TimeZone};
use devopsfetch_core::{
    AddressFamily, ConnectionStatus, ContainerImage, ContainerInstance, ContainerStatus,
    LogWindowResult, PortDetail, SocketType, UserSessions,
};
use devopsfetch_exec::{CommandError, CommandOutput, CommandSpec};
use devopsfetch_probe::{
    ContainerInventory, ContainerRuntime, JournalQuery, PortInventory, ProbeError, ProbeResult,
    ProcessOwner, ProcessTable, RawSession, SessionInventory, SessionTable, SocketTable,
    VhostInventory,
};

// ============================================================================
// Test Helpers
// ============================================================================

struct KernelTable(Vec<PortDetail>);

impl SocketTable for KernelTable {
    fn connections(&self) -> ProbeResult<Vec<PortDetail>> {
        Ok(self.0.clone())
    }
}

/// Process table where some PIDs have exited between the socket scan and
/// the owner lookup.
struct RacyProcesses {
    alive: HashMap<u32, ProcessOwner>,
    lookups: Rc<Cell<usize>>,
}

impl ProcessTable for RacyProcesses {
    fn owner(&self, pid: u32) -> Option<ProcessOwner> {
        self.lookups.set(self.lookups.get() + 1);
        self.alive.get(&pid).cloned()
    }
}

fn connection(local: &str, remote: Option<&str>, status: ConnectionStatus, pid: Option<u32>) -> PortDetail {
    let local_address = local.parse().unwrap();
    PortDetail {
        fd: pid.map(|_| 5),
        family: AddressFamily::of(&local_address),
        socket_type: if status == ConnectionStatus::None {
            SocketType::Datagram
        } else {
            SocketType::Stream
        },
        local_address,
        remote_address: remote.map(|r| r.parse().unwrap()),
        status,
        pid,
    }
}

fn host_kernel_table() -> KernelTable {
    KernelTable(vec![
        connection("0.0.0.0:22", None, ConnectionStatus::Listen, Some(10)),
        connection("[::]:22", None, ConnectionStatus::Listen, Some(10)),
        connection("127.0.0.1:5432", None, ConnectionStatus::Listen, Some(20)),
        connection("0.0.0.0:8080", None, ConnectionStatus::Listen, Some(30)),
        connection("10.0.0.2:22", Some("10.0.0.9:51234"), ConnectionStatus::Established, Some(11)),
        connection("0.0.0.0:68", None, ConnectionStatus::None, None),
    ])
}

fn racy_processes() -> RacyProcesses {
    racy_processes_counted(Rc::default())
}

fn racy_processes_counted(lookups: Rc<Cell<usize>>) -> RacyProcesses {
    let mut alive = HashMap::new();
    alive.insert(
        10,
        ProcessOwner {
            user: "root".into(),
            name: "sshd".into(),
        },
    );
    alive.insert(
        30,
        ProcessOwner {
            user: "app".into(),
            name: "java".into(),
        },
    );
    // PID 20 (postgres) exited before its owner could be read
    RacyProcesses {
        alive,
        lookups,
    }
}

// ============================================================================
// Port Inventory
// ============================================================================

#[test]
fn test_vanished_owner_is_absent_not_blank() {
    let inventory = PortInventory::new(host_kernel_table(), racy_processes());
    let records = inventory.list_ports().unwrap();

    let ports: Vec<u16> = records.iter().map(|r| r.port).collect();
    assert_eq!(ports, vec![22, 22, 8080]);
    assert!(records
        .iter()
        .all(|r| !r.owning_user.is_empty() && !r.service_name.is_empty()));
}

#[test]
fn test_only_listeners_are_resolved() {
    let lookups = Rc::new(Cell::new(0));
    let inventory = PortInventory::new(host_kernel_table(), racy_processes_counted(lookups.clone()));
    inventory.list_ports().unwrap();
    // Four LISTEN sockets with PIDs; the established one is never looked up
    assert_eq!(lookups.get(), 4);
}

#[test]
fn test_port_detail_shows_unresolved_rows_verbatim() {
    let inventory = PortInventory::new(host_kernel_table(), racy_processes());

    let ssh = inventory.port_detail(22).unwrap();
    assert_eq!(ssh.len(), 3);
    assert_eq!(ssh[2].status, ConnectionStatus::Established);
    assert_eq!(ssh[2].remote_address.map(|a| a.port()), Some(51234));

    let dhcp = inventory.port_detail(68).unwrap();
    assert_eq!(dhcp.len(), 1);
    assert_eq!(dhcp[0].pid, None);
    assert_eq!(dhcp[0].socket_type, SocketType::Datagram);

    assert!(inventory.port_detail(443).unwrap().is_empty());
}

#[test]
fn test_socket_table_failure_propagates() {
    struct Unreadable;
    impl SocketTable for Unreadable {
        fn connections(&self) -> ProbeResult<Vec<PortDetail>> {
            Err(ProbeError::SocketTable("/proc/net/tcp: permission denied".into()))
        }
    }

    let inventory = PortInventory::new(Unreadable, racy_processes());
    assert!(matches!(
        inventory.list_ports(),
        Err(ProbeError::SocketTable(_))
    ));
}

// ============================================================================
// Containers
// ============================================================================

struct StaticRuntime {
    images: Vec<ContainerImage>,
    containers: Vec<ContainerInstance>,
}

impl ContainerRuntime for StaticRuntime {
    fn images(&self) -> ProbeResult<Vec<ContainerImage>> {
        Ok(self.images.clone())
    }

    fn containers(&self) -> ProbeResult<Vec<ContainerInstance>> {
        Ok(self.containers.clone())
    }
}

#[test]
fn test_images_and_containers_are_independent() {
    let inventory = ContainerInventory::new(StaticRuntime {
        images: Vec::new(),
        containers: vec![ContainerInstance {
            id: "c0ffee".into(),
            status: ContainerStatus::Exited,
        }],
    });
    let report = inventory.list_containers().unwrap();
    assert!(report.images.is_empty());
    assert_eq!(report.containers.len(), 1);
}

// ============================================================================
// Web Server
// ============================================================================

#[test]
fn test_missing_nginx_binary_is_caught() {
    let runner = |spec: &CommandSpec| -> Result<CommandOutput, CommandError> {
        Err(CommandError::Spawn {
            program: spec.program.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        })
    };
    let err = VhostInventory::new(runner).list_domains().unwrap_err();
    assert!(matches!(err, ProbeError::Command(CommandError::Spawn { .. })));
}

#[test]
fn test_domains_in_config_order() {
    let runner = |_: &CommandSpec| -> Result<CommandOutput, CommandError> {
        Ok(CommandOutput::success(
            "server {\n  server_name b.test;\n}\nserver {\n  server_name a.test;\n}\n",
        ))
    };
    let domains = VhostInventory::new(runner).list_domains().unwrap();
    let names: Vec<&str> = domains.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["b.test", "a.test"]);
}

// ============================================================================
// Sessions
// ============================================================================

struct LoggedIn(Vec<RawSession>);

impl SessionTable for LoggedIn {
    fn sessions(&self) -> ProbeResult<Vec<RawSession>> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_nouser_gets_not_logged_in() {
    let inventory = SessionInventory::new(LoggedIn(vec![RawSession {
        username: "alice".into(),
        terminal: "pts/0".into(),
        started: 1_700_000_000,
    }]));
    let now = Local.timestamp_opt(1_700_000_100, 0).single().unwrap();

    let result = inventory.sessions_for_user("nouser", now).unwrap();
    assert!(matches!(result, UserSessions::NotLoggedIn { ref username } if username == "nouser"));
}

// ============================================================================
// Journal
// ============================================================================

#[test]
fn test_journal_sentinel_distinct_from_failure() {
    let empty = |_: &CommandSpec| -> Result<CommandOutput, CommandError> {
        Ok(CommandOutput::success(""))
    };
    let failing = |_: &CommandSpec| -> Result<CommandOutput, CommandError> {
        Ok(CommandOutput::failure(1, "boom"))
    };

    let none = JournalQuery::new(empty).activity("2024-01-01", "2024-01-01");
    let failed = JournalQuery::new(failing).activity("2024-01-01", "2024-01-01");

    assert_eq!(none.to_string(), "-- No entries --");
    assert!(matches!(failed, LogWindowResult::Error(_)));
    assert_ne!(none.to_string(), failed.to_string());
}
