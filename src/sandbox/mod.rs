//! Docker sandbox for isolated execution of untrusted code.
//!
//! Provides container-based isolation with a fixed hardening policy:
//! dropped capabilities, no network, hard resource ceilings, and a single
//! bind-mounted workspace as the only channel in or out.

mod docker;
mod error;
mod policy;

#[cfg(test)]
pub(crate) mod mock;

pub use docker::DockerSandbox;
pub use error::SandboxError;
pub use policy::{SandboxPolicy, SandboxSpec};

use async_trait::async_trait;

/// The consumed execution-runtime interface.
///
/// `run` covers the container lifecycle: create, start, and wait for
/// exit. Auto-removal is part of the spec, so a completed `run` leaves no
/// container state behind. The caller enforces the wall-clock deadline;
/// when it abandons `run` at the deadline it must call `reap` so the
/// still-running container is torn down.
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Runs one sandbox container to completion.
    async fn run(&self, spec: &SandboxSpec) -> Result<(), SandboxError>;

    /// Forcibly removes whatever container the spec left behind.
    ///
    /// Best-effort: failures are logged, not returned, because the caller
    /// is already on an error path and has nothing better to do with them.
    async fn reap(&self, spec: &SandboxSpec);
}
