//! Docker-backed implementation of the [`Sandbox`] trait.

use async_trait::async_trait;
use bollard::container::{CreateContainerOptions, RemoveContainerOptions, WaitContainerOptions};
use bollard::Docker;
use futures_util::StreamExt;
use tracing::{debug, warn};

use super::{Sandbox, SandboxError, SandboxSpec};

/// Runs sandbox containers through the local Docker daemon.
pub struct DockerSandbox {
    docker: Docker,
}

impl DockerSandbox {
    /// Connects to the local Docker daemon and verifies it is reachable.
    pub async fn connect() -> Result<Self, SandboxError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| SandboxError::docker_unavailable(e.to_string()))?;

        docker
            .ping()
            .await
            .map_err(|e| SandboxError::docker_unavailable(e.to_string()))?;

        Ok(Self { docker })
    }
}

#[async_trait]
impl Sandbox for DockerSandbox {
    async fn run(&self, spec: &SandboxSpec) -> Result<(), SandboxError> {
        debug!(container = %spec.name, "creating container");
        self.docker
            .create_container(
                Some(CreateContainerOptions {
                    name: spec.name.clone(),
                    platform: None,
                }),
                spec.config.clone(),
            )
            .await
            .map_err(|e| SandboxError::create_failed(e.to_string()))?;

        debug!(container = %spec.name, "starting container");
        self.docker
            .start_container::<String>(&spec.name, None)
            .await
            .map_err(|e| SandboxError::start_failed(e.to_string()))?;

        let mut wait = self
            .docker
            .wait_container(&spec.name, None::<WaitContainerOptions<String>>);

        match wait.next().await {
            Some(Ok(exit)) => {
                // The exit code is not the success signal; the result
                // document in the workspace is. Only record it.
                debug!(container = %spec.name, status_code = exit.status_code, "container exited");
                Ok(())
            }
            // Auto-remove can reap the container before the wait call
            // observes the exit.
            Some(Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404,
                ..
            }))
            | None => {
                debug!(container = %spec.name, "container already removed");
                Ok(())
            }
            Some(Err(e)) => Err(SandboxError::wait_failed(e.to_string())),
        }
    }

    async fn reap(&self, spec: &SandboxSpec) {
        warn!(container = %spec.name, "removing abandoned container");
        let result = self
            .docker
            .remove_container(
                &spec.name,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await;

        match result {
            Ok(()) => {}
            // Auto-remove may have beaten us to it.
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {}
            Err(e) => {
                warn!(container = %spec.name, error = %e, "failed to remove abandoned container");
            }
        }
    }
}
