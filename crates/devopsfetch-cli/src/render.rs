//! Report rendering: `comfy-table` tables, or pretty JSON with `--json`.
//!
//! Every function returns the full text to print. Empty-result placeholders
//! are produced here so the probes only ever return rows.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::Table;
use devopsfetch_core::{
    ActiveSession, ContainerReport, Domain, DomainDetail, HistoricalLoginRecord, LogWindowResult,
    PortDetail, PortRecord, UserSessions,
};
use serde::Serialize;
use serde_json::json;

use crate::error::Result;

pub const NO_IMAGES: &str = "No Docker images found.";
pub const NO_CONTAINERS: &str = "No Docker containers found.";

/// How reports are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header.to_vec());
    table
}

fn property_table(rows: &[(&str, String)]) -> String {
    let mut table = table(&["Property", "Value"]);
    for (property, value) in rows {
        table.add_row(vec![property.to_string(), value.clone()]);
    }
    table.to_string()
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ============================================================================
// Ports
// ============================================================================

pub fn ports(rows: &[PortRecord], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(rows);
    }

    let mut table = table(&["Port", "User", "Service"]);
    for row in rows {
        table.add_row(vec![
            row.port.to_string(),
            row.owning_user.clone(),
            row.service_name.clone(),
        ]);
    }
    Ok(table.to_string())
}

pub fn port_detail(rows: &[PortDetail], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(rows);
    }

    let mut table = table(&["FD", "Family", "Type", "Laddr", "Raddr", "Status", "PID"]);
    for row in rows {
        table.add_row(vec![
            optional(row.fd),
            row.family.to_string(),
            row.socket_type.to_string(),
            row.local_address.to_string(),
            optional(row.remote_address),
            row.status.to_string(),
            optional(row.pid),
        ]);
    }
    Ok(table.to_string())
}

// ============================================================================
// Containers
// ============================================================================

/// Images then containers, each replaced by its placeholder when empty.
pub fn containers(report: &ContainerReport, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let mut sections = Vec::new();

    if report.images.is_empty() {
        sections.push(NO_IMAGES.to_string());
    } else {
        let mut images = table(&["Image ID"]);
        for image in &report.images {
            images.add_row(vec![image.id.clone()]);
        }
        sections.push(format!("Docker Images:\n{images}"));
    }

    if report.containers.is_empty() {
        sections.push(NO_CONTAINERS.to_string());
    } else {
        let mut containers = table(&["Container ID", "Status"]);
        for container in &report.containers {
            containers.add_row(vec![container.id.clone(), container.status.to_string()]);
        }
        sections.push(format!("Docker Containers:\n{containers}"));
    }

    Ok(sections.join("\n"))
}

// ============================================================================
// Web Server
// ============================================================================

pub fn domains(rows: &[Domain], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(rows);
    }

    let mut table = table(&["Domain"]);
    for domain in rows {
        table.add_row(vec![domain.name.clone()]);
    }
    Ok(table.to_string())
}

/// One property table per matching server block.
pub fn domain_detail(detail: &DomainDetail, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(detail);
    }

    if !detail.is_configured() {
        return Ok(format!(
            "Domain {} was not found in the nginx configuration.",
            detail.name
        ));
    }

    let blocks: Vec<String> = detail
        .server_blocks
        .iter()
        .map(|block| {
            property_table(&[
                ("Server Names", block.server_names.join(" ")),
                ("Listen", block.listen.join(", ")),
            ])
        })
        .collect();

    Ok(format!(
        "Detailed info for domain: {}\n{}",
        detail.name,
        blocks.join("\n\n")
    ))
}

// ============================================================================
// Users
// ============================================================================

pub fn accounts(rows: &[HistoricalLoginRecord], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(rows);
    }

    let mut table = table(&["User", "Last Login"]);
    for row in rows {
        table.add_row(vec![row.username.clone(), row.last_login.clone()]);
    }
    Ok(table.to_string())
}

pub fn sessions(rows: &[ActiveSession], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(rows);
    }

    let mut table = table(&["Username", "Terminal", "Login Time", "Session Duration"]);
    for session in rows {
        table.add_row(vec![
            session.username.clone(),
            session.terminal.clone(),
            session.login_time_display(),
            session.duration.to_string(),
        ]);
    }
    Ok(table.to_string())
}

/// Not-logged-in message, or one property table per session.
pub fn user_sessions(result: &UserSessions, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(result);
    }

    match result {
        UserSessions::NotLoggedIn { username } => Ok(UserSessions::not_logged_in_message(username)),
        UserSessions::Sessions { sessions } => {
            let blocks: Vec<String> = sessions
                .iter()
                .map(|session| {
                    property_table(&[
                        ("Username", session.username.clone()),
                        ("Terminal", session.terminal.clone()),
                        ("Login Time", session.login_time_display()),
                        ("Session Duration", session.duration.to_string()),
                    ])
                })
                .collect();
            Ok(blocks.join("\n\n"))
        }
    }
}

// ============================================================================
// Journal
// ============================================================================

pub fn activity(result: &LogWindowResult, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(result);
    }
    Ok(result.to_string())
}

// ============================================================================
// Errors
// ============================================================================

/// A failed query, as `Error: ...` text or a JSON `{"error": ...}` object.
pub fn error(message: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format!("Error: {message}")),
        OutputFormat::Json => to_json(&json!({ "error": message })),
    }
}

// ============================================================================
// Tests
// ============================================================================
