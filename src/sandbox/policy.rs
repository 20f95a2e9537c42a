//! Translates the fixed security policy into a concrete container spec.
//!
//! Every field of the resulting spec is derived from configuration that is
//! resolved once at startup; the only per-request variable is the
//! workspace path that gets bind-mounted. Untrusted request content never
//! influences the spec.

use anyhow::{Context, Result};
use bollard::container::Config as ContainerConfig;
use bollard::service::HostConfig;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::SandboxConfig;
use crate::workspace::Workspace;

/// A fully resolved description of one sandbox container.
#[derive(Debug, Clone)]
pub struct SandboxSpec {
    /// Container name, derived from the workspace id.
    pub name: String,
    /// Host path of the workspace backing the bind mount.
    pub workspace: PathBuf,
    /// The container configuration handed to the runtime.
    pub config: ContainerConfig<String>,
    /// Hard deadline on the wait-for-exit step.
    pub wait_timeout: Duration,
}

/// The fixed host security policy.
///
/// Resolved from [`SandboxConfig`] once at startup; limits are parsed and
/// the run-as identity is captured here so that building a spec per
/// request is infallible.
#[derive(Debug, Clone)]
pub struct SandboxPolicy {
    image: String,
    command: Vec<String>,
    mount_point: String,
    memory_bytes: i64,
    nano_cpus: i64,
    user: String,
    wait_timeout: Duration,
}

impl SandboxPolicy {
    /// Resolves the policy from configuration.
    ///
    /// The container runs as the invoking host process's uid:gid, never as
    /// the image's default user (typically root).
    pub fn from_config(config: &SandboxConfig) -> Result<Self> {
        let memory_bytes = parse_memory_limit(&config.memory)?;
        let cpus: f64 = config
            .cpus
            .parse()
            .with_context(|| format!("Invalid CPU limit: {}", config.cpus))?;

        Ok(Self {
            image: config.image.clone(),
            command: config.command.clone(),
            mount_point: config.mount_point.clone(),
            memory_bytes,
            nano_cpus: (cpus * 1_000_000_000.0) as i64,
            user: format!("{}:{}", nix::unistd::getuid(), nix::unistd::getgid()),
            wait_timeout: Duration::from_secs(config.wait_timeout_secs),
        })
    }

    /// Builds the container spec for one workspace.
    ///
    /// Pure function of the policy and the workspace identity: all
    /// capabilities dropped, privilege escalation disabled, no network,
    /// hard memory/CPU ceilings, exactly one read-write bind mount, and
    /// auto-removal once the container exits.
    pub fn build_spec(&self, workspace: &Workspace) -> SandboxSpec {
        let host_path = workspace.path().to_string_lossy().into_owned();

        let config = ContainerConfig {
            image: Some(self.image.clone()),
            cmd: Some(self.command.clone()),
            user: Some(self.user.clone()),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            host_config: Some(HostConfig {
                cap_drop: Some(vec!["ALL".to_string()]),
                security_opt: Some(vec!["no-new-privileges".to_string()]),
                network_mode: Some("none".to_string()),
                memory: Some(self.memory_bytes),
                nano_cpus: Some(self.nano_cpus),
                binds: Some(vec![format!("{host_path}:{}", self.mount_point)]),
                auto_remove: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        SandboxSpec {
            name: format!("coderun-{}", workspace.id()),
            workspace: workspace.path().to_path_buf(),
            config,
            wait_timeout: self.wait_timeout,
        }
    }
}

/// Parse memory limit string (e.g., "1g", "256m") to bytes
fn parse_memory_limit(limit: &str) -> Result<i64> {
    let limit = limit.to_lowercase();

    if let Some(num) = limit.strip_suffix('g') {
        let gigs: i64 = num.parse().context("Invalid memory limit")?;
        Ok(gigs * 1024 * 1024 * 1024)
    } else if let Some(num) = limit.strip_suffix('m') {
        let megs: i64 = num.parse().context("Invalid memory limit")?;
        Ok(megs * 1024 * 1024)
    } else {
        limit.parse().context("Invalid memory limit")
    }
}
