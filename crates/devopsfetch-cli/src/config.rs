//! Optional TOML configuration.
//!
//! ```toml
//! log_file = "/var/log/devopsfetch.log"
//! command_timeout_secs = 30
//!
//! [commands]
//! nginx = "nginx"
//! journalctl = "journalctl"
//! last = "last"
//! docker = "docker"
//! ```
//!
//! Every key is optional and unknown keys are rejected.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use devopsfetch_probe::containers::DEFAULT_DOCKER_PROGRAM;
use devopsfetch_probe::journal::DEFAULT_JOURNALCTL_PROGRAM;
use devopsfetch_probe::users::DEFAULT_LAST_PROGRAM;
use devopsfetch_probe::vhost::DEFAULT_NGINX_PROGRAM;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CliError, Result};

/// Timeout applied to external commands when the config does not set one.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Returns the default config path (`<config_dir>/devopsfetch/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("devopsfetch").join("config.toml"))
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Overrides the default log location.
    pub log_file: Option<PathBuf>,

    /// Seconds before an external command is killed; `0` disables the limit.
    pub command_timeout_secs: Option<u64>,

    pub commands: Commands,
}

/// Program names for each external command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Commands {
    pub nginx: String,
    pub journalctl: String,
    pub last: String,
    pub docker: String,
}

impl Default for Commands {
    fn default() -> Self {
        Self {
            nginx: DEFAULT_NGINX_PROGRAM.to_string(),
            journalctl: DEFAULT_JOURNALCTL_PROGRAM.to_string(),
            last: DEFAULT_LAST_PROGRAM.to_string(),
            docker: DEFAULT_DOCKER_PROGRAM.to_string(),
        }
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// if present and defaults apply otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reads and parses one config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Timeout for external commands, `None` when disabled.
    pub fn command_timeout(&self) -> Option<Duration> {
        match self.command_timeout_secs.unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
