//! Web-server virtual host rows.

use serde::Serialize;

/// A domain named by a `server_name` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Domain {
    pub name: String,
}

impl Domain {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One `server { ... }` block found in the configuration dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerBlock {
    /// Every name from the block's `server_name` lines, in order
    pub server_names: Vec<String>,
    /// Values of the block's `listen` directives, in order
    pub listen: Vec<String>,
}

impl ServerBlock {
    /// True if `domain` is one of this block's server names.
    pub fn serves(&self, domain: &str) -> bool {
        self.server_names.iter().any(|name| name == domain)
    }
}

/// Detail for a single requested domain.
///
/// `server_blocks` is empty when the domain is not configured; that is an
/// answer, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainDetail {
    pub name: String,
    pub server_blocks: Vec<ServerBlock>,
}

impl DomainDetail {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.server_blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_block_serves_exact_name_only() {
        let block = ServerBlock {
            server_names: vec!["example.com".into(), "www.example.com".into()],
            listen: vec!["80".into()],
        };
        assert!(block.serves("www.example.com"));
        assert!(!block.serves("example"));
    }

    #[test]
    fn test_unconfigured_detail() {
        let detail = DomainDetail {
            name: "missing.test".into(),
            server_blocks: Vec::new(),
        };
        assert!(!detail.is_configured());
    }
}
