//! Container runtime snapshot rows.

use serde::{Serialize, Serializer};
use std::fmt;

/// A container image, identified by its full image id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerImage {
    pub id: String,
}

/// Container run state as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    /// A state this build does not know about, kept verbatim
    Other(String),
}

impl ContainerStatus {
    /// Parses a runtime state string. Unknown states are preserved.
    pub fn parse(state: &str) -> Self {
        match state.trim().to_ascii_lowercase().as_str() {
            "created" => Self::Created,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "restarting" => Self::Restarting,
            "removing" => Self::Removing,
            "exited" => Self::Exited,
            "dead" => Self::Dead,
            _ => Self::Other(state.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Restarting => "restarting",
            Self::Removing => "removing",
            Self::Exited => "exited",
            Self::Dead => "dead",
            Self::Other(s) => s,
        }
    }
}

impl Serialize for ContainerStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A container in any run state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInstance {
    pub id: String,
    pub status: ContainerStatus,
}

/// Images and containers, listed independently.
///
/// An empty set is a normal answer; the renderer shows a placeholder for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerReport {
    pub images: Vec<ContainerImage>,
    pub containers: Vec<ContainerInstance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_known() {
        assert_eq!(ContainerStatus::parse("running"), ContainerStatus::Running);
        assert_eq!(ContainerStatus::parse("Exited"), ContainerStatus::Exited);
        assert_eq!(ContainerStatus::parse(" dead\n"), ContainerStatus::Dead);
    }

    #[test]
    fn test_status_parse_unknown_is_preserved() {
        let status = ContainerStatus::parse("hibernating");
        assert_eq!(status, ContainerStatus::Other("hibernating".to_string()));
        assert_eq!(status.to_string(), "hibernating");
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ContainerStatus::Running).unwrap(),
            "\"running\""
        );
        assert_eq!(
            serde_json::to_string(&ContainerStatus::Other("odd".into())).unwrap(),
            "\"odd\""
        );
    }
}
