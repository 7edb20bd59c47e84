//! nginx virtual hosts from the `nginx -T` configuration dump.
//!
//! Both parsers here are line-oriented heuristics, not an nginx grammar.
//!
//! Known limitations of [`parse_server_names`], kept on purpose because
//! callers may rely on the output as it stands:
//! - only the first name of a `server_name` line is taken
//! - any line *containing* `server_name` matches, so commented-out
//!   declarations and directives such as `server_names_hash_bucket_size`
//!   are picked up too
//!
//! [`parse_server_blocks`] (used for single-domain detail) strips `#`
//! comments and tracks braces, so it only sees live `server { }` blocks.

use std::time::Duration;

use devopsfetch_core::{Domain, DomainDetail, ServerBlock};
use devopsfetch_exec::{CommandRunner, CommandSpec};
use tracing::{debug, info};

use crate::error::ProbeResult;

/// Token that marks a server-name declaration.
pub const SERVER_NAME_TOKEN: &str = "server_name";

/// Default web server binary.
pub const DEFAULT_NGINX_PROGRAM: &str = "nginx";

// ============================================================================
// Parsers
// ============================================================================

/// Extracts one domain per line containing `server_name`.
///
/// The domain is the second whitespace-separated token with `;` trimmed.
/// Lines with no second token are skipped. Duplicates are kept in order.
pub fn parse_server_names(config: &str) -> Vec<Domain> {
    config
        .lines()
        .filter(|line| line.contains(SERVER_NAME_TOKEN))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(|token| token.trim_matches(';'))
        .filter(|name| !name.is_empty())
        .map(Domain::new)
        .collect()
}

/// Splits the dump into `server { ... }` blocks with their names and listens.
pub fn parse_server_blocks(config: &str) -> Vec<ServerBlock> {
    let mut blocks = Vec::new();
    let mut depth: i64 = 0;
    // Open block and the depth it was opened at
    let mut open: Option<(ServerBlock, i64)> = None;

    for raw in config.lines() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let directive = tokens.next().unwrap_or_default();

        if open.is_none() && opens_server_block(directive, line) {
            open = Some((ServerBlock::default(), depth));
        } else if let Some((block, _)) = open.as_mut() {
            let values = tokens.map(|t| t.trim_end_matches(';')).filter(|t| !t.is_empty());
            match directive {
                "server_name" => block.server_names.extend(values.map(str::to_string)),
                "listen" => {
                    let value = values.collect::<Vec<_>>().join(" ");
                    if !value.is_empty() {
                        block.listen.push(value);
                    }
                }
                _ => {}
            }
        }

        depth += brace_delta(line);

        if let Some((_, opened_at)) = open.as_ref() {
            if depth <= *opened_at {
                if let Some((block, _)) = open.take() {
                    blocks.push(block);
                }
            }
        }
    }

    blocks
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => line.get(..idx).unwrap_or(line),
        None => line,
    }
}

fn opens_server_block(directive: &str, line: &str) -> bool {
    directive == "server{" || (directive == "server" && line.contains('{'))
}

fn brace_delta(line: &str) -> i64 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

// ============================================================================
// Vhost Inventory
// ============================================================================

/// Domains configured in the web server.
pub struct VhostInventory<R> {
    runner: R,
    program: String,
    timeout: Option<Duration>,
}

impl<R: CommandRunner> VhostInventory<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            program: DEFAULT_NGINX_PROGRAM.to_string(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs `nginx -T` and returns the configuration text.
    fn dump(&self) -> ProbeResult<String> {
        let spec = CommandSpec::new(&self.program)
            .arg("-T")
            .timeout(self.timeout);
        info!(command = %spec, "Dumping web server configuration");
        let config = self.runner.run(&spec)?.into_success(&self.program)?;
        debug!(bytes = config.len(), "Configuration dump captured");
        Ok(config)
    }

    /// Every `server_name` declaration, in configuration order.
    pub fn list_domains(&self) -> ProbeResult<Vec<Domain>> {
        let domains = parse_server_names(&self.dump()?);
        debug!(domains = domains.len(), "Parsed server names");
        Ok(domains)
    }

    /// Server blocks that serve `name`; none found is still a result.
    pub fn domain_detail(&self, name: &str) -> ProbeResult<DomainDetail> {
        let server_blocks: Vec<ServerBlock> = parse_server_blocks(&self.dump()?)
            .into_iter()
            .filter(|block| block.serves(name))
            .collect();

        debug!(domain = name, blocks = server_blocks.len(), "Domain detail complete");
        Ok(DomainDetail {
            name: name.to_string(),
            server_blocks,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
