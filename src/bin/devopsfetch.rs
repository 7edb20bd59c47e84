//! devopsfetch - point-in-time host inspection reports
//!
//! Answers one question per invocation and prints it as a table.
//!
//! # Usage
//!
//! ```text
//! devopsfetch -p              # listening ports with user and service
//! devopsfetch -p 22           # every connection on port 22
//! devopsfetch -d              # container images and containers
//! devopsfetch -n              # nginx domains
//! devopsfetch -n example.com  # server blocks for one domain
//! devopsfetch -u              # active login sessions
//! devopsfetch -u alice        # sessions of one user
//! devopsfetch -a              # system accounts with last login
//! devopsfetch -t 2024-01-01 2024-01-02
//! ```

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use tracing::{error, info};

use devopsfetch_cli::{logging, report, Config, OutputFormat, Query};

// ============================================================================
// CLI Arguments
// ============================================================================

/// Value of a bare `-u`/`--users`, also accepted explicitly.
const ALL_USERS: &str = "list";

/// Value of a bare `-p`/`--port`, also accepted explicitly.
const ALL_PORTS: &str = "all";

/// DevOps Fetch Tool - ports, containers, nginx, users and journal activity
#[derive(Parser, Debug)]
#[command(name = "devopsfetch")]
#[command(about = "Collect and display system information for DevOps")]
#[command(version)]
struct Args {
    /// Display all active ports or detailed info about a specific port
    #[arg(short, long, value_name = "PORT", num_args = 0..=1, default_missing_value = ALL_PORTS)]
    port: Option<String>,

    /// List all Docker images and containers
    #[arg(short, long)]
    docker: bool,

    /// Display all Nginx domains or detailed config for a specific domain
    #[arg(short, long, value_name = "DOMAIN", num_args = 0..=1, default_missing_value = "")]
    nginx: Option<String>,

    /// Display active sessions or the sessions of a specific user
    #[arg(short, long, value_name = "USER", num_args = 0..=1, default_missing_value = ALL_USERS)]
    users: Option<String>,

    /// List system accounts (UID 0-999) with their last login
    #[arg(short, long)]
    accounts: bool,

    /// Display journal activity within a date range (YYYY-MM-DD)
    #[arg(short, long, num_args = 2, value_names = ["START", "END"])]
    time: Option<Vec<String>>,

    /// Print rows as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Configuration file (default: <config_dir>/devopsfetch/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Args {
    /// The query selected by the flags, first match wins.
    fn query(&self) -> Result<Option<Query>> {
        if let Some(port) = &self.port {
            if port == ALL_PORTS {
                return Ok(Some(Query::Ports));
            }
            return match port.parse::<u16>() {
                Ok(port) => Ok(Some(Query::PortDetail(port))),
                Err(_) => bail!("invalid port: {port}"),
            };
        }

        if self.docker {
            return Ok(Some(Query::Containers));
        }

        if let Some(domain) = &self.nginx {
            return Ok(Some(if domain.is_empty() {
                Query::Domains
            } else {
                Query::DomainDetail(domain.clone())
            }));
        }

        if let Some(user) = &self.users {
            return Ok(Some(if user.is_empty() || user == ALL_USERS {
                Query::Sessions
            } else {
                Query::User(user.clone())
            }));
        }

        if self.accounts {
            return Ok(Some(Query::Accounts));
        }

        if let Some([start, end]) = self.time.as_deref() {
            return Ok(Some(Query::Activity {
                start: start.clone(),
                end: end.clone(),
            }));
        }

        Ok(None)
    }

    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    let Some(query) = args.query()? else {
        Args::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load(args.config.as_deref())?;
    logging::init(&config);

    info!(query = %query, "devopsfetch starting");

    match report::run(&query, &config, args.format()) {
        Ok(text) => {
            println!("{text}");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, query = %query, "Report failed");
            Err(e.into())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn query(argv: &[&str]) -> Option<Query> {
        let args = Args::try_parse_from(std::iter::once("devopsfetch").chain(argv.iter().copied()))
            .unwrap();
        args.query().unwrap()
    }

    #[test]
    fn test_no_flags_is_help() {
        assert_eq!(query(&[]), None);
        assert_eq!(query(&["--json"]), None);
    }

    #[test]
    fn test_port_flag() {
        assert_eq!(query(&["-p"]), Some(Query::Ports));
        assert_eq!(query(&["--port", "all"]), Some(Query::Ports));
        assert_eq!(query(&["-p", "8080"]), Some(Query::PortDetail(8080)));
    }

    #[test]
    fn test_invalid_port_is_error() {
        let args = Args::try_parse_from(["devopsfetch", "-p", "http"]).unwrap();
        assert!(args.query().is_err());
    }

    #[test]
    fn test_nginx_flag() {
        assert_eq!(query(&["-n"]), Some(Query::Domains));
        assert_eq!(
            query(&["-n", "example.com"]),
            Some(Query::DomainDetail("example.com".into()))
        );
    }

    #[test]
    fn test_users_flag() {
        assert_eq!(query(&["-u"]), Some(Query::Sessions));
        assert_eq!(query(&["-u", "list"]), Some(Query::Sessions));
        assert_eq!(query(&["--users", "alice"]), Some(Query::User("alice".into())));
    }

    #[test]
    fn test_time_needs_two_dates() {
        assert_eq!(
            query(&["-t", "2024-01-01", "2024-01-02"]),
            Some(Query::Activity {
                start: "2024-01-01".into(),
                end: "2024-01-02".into()
            })
        );
        assert!(Args::try_parse_from(["devopsfetch", "-t", "2024-01-01"]).is_err());
    }

    #[test]
    fn test_first_flag_wins() {
        assert_eq!(query(&["-d", "-a"]), Some(Query::Containers));
        assert_eq!(query(&["-a", "-t", "2024-01-01", "2024-01-01"]), Some(Query::Accounts));
    }

    #[test]
    fn test_json_and_config() {
        let args =
            Args::try_parse_from(["devopsfetch", "-d", "--json", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(args.format(), OutputFormat::Json);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }
}
