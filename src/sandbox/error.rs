//! Domain-specific error types for sandbox operations.
//!
//! Typed errors enable callers to match on specific failure modes
//! rather than parsing error message strings.

use std::time::Duration;

/// Errors that can occur while driving a sandbox container.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Docker daemon is not running or not accessible.
    #[error("Docker is not available: {message}")]
    DockerUnavailable { message: String },

    /// Container could not be created from the spec.
    #[error("failed to create container: {message}")]
    CreateFailed { message: String },

    /// Container was created but could not be started.
    #[error("failed to start container: {message}")]
    StartFailed { message: String },

    /// Waiting for the container to exit failed at the runtime layer.
    #[error("failed to wait for container: {message}")]
    WaitFailed { message: String },

    /// Container execution exceeded the configured deadline.
    #[error("execution timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

impl SandboxError {
    /// Creates a `DockerUnavailable` error.
    pub fn docker_unavailable(message: impl Into<String>) -> Self {
        Self::DockerUnavailable {
            message: message.into(),
        }
    }

    /// Creates a `CreateFailed` error.
    pub fn create_failed(message: impl Into<String>) -> Self {
        Self::CreateFailed {
            message: message.into(),
        }
    }

    /// Creates a `StartFailed` error.
    pub fn start_failed(message: impl Into<String>) -> Self {
        Self::StartFailed {
            message: message.into(),
        }
    }

    /// Creates a `WaitFailed` error.
    pub fn wait_failed(message: impl Into<String>) -> Self {
        Self::WaitFailed {
            message: message.into(),
        }
    }

    /// Creates a `Timeout` error from a `Duration`.
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout {
            timeout_secs: duration.as_secs(),
        }
    }

    /// Returns true if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docker_unavailable_error() {
        let err = SandboxError::docker_unavailable("daemon not running");
        assert!(!err.is_timeout());
        assert_eq!(
            err.to_string(),
            "Docker is not available: daemon not running"
        );
    }

    #[test]
    fn test_timeout_error() {
        let err = SandboxError::timeout(Duration::from_secs(30));
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "execution timed out after 30 seconds");
    }

    #[test]
    fn test_create_and_start_errors_are_distinct() {
        let create = SandboxError::create_failed("no such image");
        let start = SandboxError::start_failed("port in use");

        assert_eq!(create.to_string(), "failed to create container: no such image");
        assert_eq!(start.to_string(), "failed to start container: port in use");
        assert!(!create.is_timeout());
        assert!(!start.is_timeout());
    }

    #[test]
    fn test_wait_failed_error() {
        let err = SandboxError::wait_failed("connection reset");
        assert_eq!(
            err.to_string(),
            "failed to wait for container: connection reset"
        );
    }
}
