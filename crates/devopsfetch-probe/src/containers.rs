//! Container images and instances from a container runtime.

use std::collections::HashSet;
use std::time::Duration;

use devopsfetch_core::{ContainerImage, ContainerInstance, ContainerReport, ContainerStatus};
use devopsfetch_exec::{CommandRunner, CommandSpec};
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};

/// Default runtime CLI.
pub const DEFAULT_DOCKER_PROGRAM: &str = "docker";

/// Read-only view of a container runtime.
pub trait ContainerRuntime {
    /// All images known to the runtime.
    fn images(&self) -> ProbeResult<Vec<ContainerImage>>;

    /// All containers, running or not.
    fn containers(&self) -> ProbeResult<Vec<ContainerInstance>>;
}

// ============================================================================
// Docker CLI Client
// ============================================================================

/// Runtime client driving a docker-compatible CLI (`docker`, `podman`).
///
/// Constructed explicitly and owned by whoever queries it.
pub struct DockerCli<R> {
    runner: R,
    program: String,
    timeout: Option<Duration>,
}

impl<R: CommandRunner> DockerCli<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            program: DEFAULT_DOCKER_PROGRAM.to_string(),
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

    fn query<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> ProbeResult<String> {
        let spec = CommandSpec::new(&self.program)
            .args(args)
            .timeout(self.timeout);
        let stdout = self.runner.run(&spec)?.into_success(&self.program)?;
        Ok(stdout)
    }
}

impl<R: CommandRunner> ContainerRuntime for DockerCli<R> {
    fn images(&self) -> ProbeResult<Vec<ContainerImage>> {
        let stdout = self.query(["images", "--no-trunc", "--quiet"])?;

        // One line per tag; an image with several tags is listed once
        let mut seen = HashSet::new();
        let images: Vec<ContainerImage> = stdout
            .lines()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .filter(|id| seen.insert(id.to_string()))
            .map(|id| ContainerImage { id: id.to_string() })
            .collect();

        debug!(images = images.len(), "Listed container images");
        Ok(images)
    }

    fn containers(&self) -> ProbeResult<Vec<ContainerInstance>> {
        let stdout = self.query([
            "ps",
            "--all",
            "--no-trunc",
            "--format",
            "{{.ID}}\t{{.State}}",
        ])?;

        let mut containers = Vec::new();
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            let (id, state) = line.split_once('\t').ok_or_else(|| ProbeError::UnexpectedOutput {
                program: self.program.clone(),
                line: line.to_string(),
            })?;
            containers.push(ContainerInstance {
                id: id.trim().to_string(),
                status: ContainerStatus::parse(state),
            });
        }

        debug!(containers = containers.len(), "Listed containers");
        Ok(containers)
    }
}

// ============================================================================
// Container Inventory
// ============================================================================

/// Lists images and containers from an owned runtime client.
pub struct ContainerInventory<C> {
    runtime: C,
}

impl<C: ContainerRuntime> ContainerInventory<C> {
    pub fn new(runtime: C) -> Self {
        Self { runtime }
    }

    /// Both row sets; either may be empty.
    pub fn list_containers(&self) -> ProbeResult<ContainerReport> {
        Ok(ContainerReport {
            images: self.runtime.images()?,
            containers: self.runtime.containers()?,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
