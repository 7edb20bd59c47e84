//! Query dispatch: build the OS-backed sources, run one probe, render.
//!
//! Expected command failures (missing binary, non-zero exit, timeout) come
//! back as printable `Error: ...` text. Only unreadable OS tables and output
//! serialization failures are returned as [`CliError`](crate::CliError).

use std::fmt;

use chrono::Local;
use devopsfetch_exec::{CommandRunner, SystemRunner};
use devopsfetch_probe::{
    AccountDatabase, ContainerInventory, DockerCli, JournalQuery, LoginHistory, PasswdAccounts,
    PortInventory, ProbeError, ProbeResult, ProcfsSocketTable, SessionInventory,
    SysinfoProcessTable, UtmpSessionTable, VhostInventory,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::render::{self, OutputFormat};

/// The one question asked per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Ports,
    PortDetail(u16),
    Containers,
    Domains,
    DomainDetail(String),
    Sessions,
    User(String),
    Accounts,
    Activity { start: String, end: String },
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ports => write!(f, "ports"),
            Self::PortDetail(port) => write!(f, "port {port}"),
            Self::Containers => write!(f, "containers"),
            Self::Domains => write!(f, "domains"),
            Self::DomainDetail(name) => write!(f, "domain {name}"),
            Self::Sessions => write!(f, "sessions"),
            Self::User(name) => write!(f, "user {name}"),
            Self::Accounts => write!(f, "accounts"),
            Self::Activity { start, end } => write!(f, "activity {start}..{end}"),
        }
    }
}

/// Runs `query` against this host and returns the text to print.
pub fn run(query: &Query, config: &Config, format: OutputFormat) -> Result<String> {
    info!(query = %query, ?format, "Running report");
    let runner = SystemRunner::new();
    let now = Local::now();

    match query {
        Query::Ports => {
            let inventory =
                PortInventory::new(ProcfsSocketTable::new(), SysinfoProcessTable::snapshot());
            render::ports(&inventory.list_ports()?, format)
        }
        Query::PortDetail(port) => {
            let inventory =
                PortInventory::new(ProcfsSocketTable::new(), SysinfoProcessTable::snapshot());
            render::port_detail(&inventory.port_detail(*port)?, format)
        }
        Query::Containers => containers(runner, config, format),
        Query::Domains => domains(runner, config, format),
        Query::DomainDetail(name) => domain_detail(runner, config, name, format),
        Query::Sessions => {
            let inventory = SessionInventory::new(UtmpSessionTable::new());
            render::sessions(&inventory.active_sessions(now)?, format)
        }
        Query::User(name) => {
            let inventory = SessionInventory::new(UtmpSessionTable::new());
            render::user_sessions(&inventory.sessions_for_user(name, now)?, format)
        }
        Query::Accounts => accounts(PasswdAccounts::new(), runner, config, format),
        Query::Activity { start, end } => activity(runner, config, start, end, format),
    }
}

// ============================================================================
// Command-backed Reports
// ============================================================================

/// Renders a probe result, turning command failures into `Error:` text.
fn render_or_report<T>(
    result: ProbeResult<T>,
    format: OutputFormat,
    show: impl FnOnce(&T, OutputFormat) -> Result<String>,
) -> Result<String> {
    match result {
        Ok(rows) => show(&rows, format),
        Err(e @ (ProbeError::Command(_) | ProbeError::UnexpectedOutput { .. })) => {
            warn!(error = %e, "Query failed");
            render::error(&e.to_string(), format)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn containers<R: CommandRunner>(
    runner: R,
    config: &Config,
    format: OutputFormat,
) -> Result<String> {
    let client = DockerCli::new(runner)
        .with_program(&config.commands.docker)
        .with_timeout(config.command_timeout());
    let inventory = ContainerInventory::new(client);
    render_or_report(inventory.list_containers(), format, render::containers)
}

fn vhosts<R: CommandRunner>(runner: R, config: &Config) -> VhostInventory<R> {
    VhostInventory::new(runner)
        .with_program(&config.commands.nginx)
        .with_timeout(config.command_timeout())
}

pub fn domains<R: CommandRunner>(runner: R, config: &Config, format: OutputFormat) -> Result<String> {
    render_or_report(vhosts(runner, config).list_domains(), format, |rows, format| {
        render::domains(rows, format)
    })
}

pub fn domain_detail<R: CommandRunner>(
    runner: R,
    config: &Config,
    name: &str,
    format: OutputFormat,
) -> Result<String> {
    render_or_report(
        vhosts(runner, config).domain_detail(name),
        format,
        render::domain_detail,
    )
}

pub fn accounts<A: AccountDatabase, R: CommandRunner>(
    accounts: A,
    runner: R,
    config: &Config,
    format: OutputFormat,
) -> Result<String> {
    let history = LoginHistory::new(accounts, runner)
        .with_program(&config.commands.last)
        .with_timeout(config.command_timeout());
    render::accounts(&history.list_system_accounts(), format)
}

pub fn activity<R: CommandRunner>(
    runner: R,
    config: &Config,
    start: &str,
    end: &str,
    format: OutputFormat,
) -> Result<String> {
    let query = JournalQuery::new(runner)
        .with_program(&config.commands.journalctl)
        .with_timeout(config.command_timeout());
    render::activity(&query.activity(start, end), format)
}

// ============================================================================
// Tests
// ============================================================================
