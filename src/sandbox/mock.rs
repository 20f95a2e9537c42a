//! Scripted sandbox implementation for tests that must not touch Docker.

use async_trait::async_trait;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{Sandbox, SandboxError, SandboxSpec};

/// A sandbox that writes a fixed set of artifact files into the workspace
/// instead of running a container.
pub(crate) struct MockSandbox {
    files: Vec<(String, String)>,
    failure: Option<String>,
    hang: bool,
    calls: Arc<AtomicUsize>,
    reaps: Arc<AtomicUsize>,
}

impl MockSandbox {
    fn new(files: &[(&str, &str)], failure: Option<String>, hang: bool) -> Self {
        Self {
            files: files
                .iter()
                .map(|(n, c)| ((*n).to_string(), (*c).to_string()))
                .collect(),
            failure,
            hang,
            calls: Arc::new(AtomicUsize::new(0)),
            reaps: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A sandbox whose "container" produces the given workspace files.
    pub(crate) fn producing(files: &[(&str, &str)]) -> Self {
        Self::new(files, None, false)
    }

    /// A sandbox that fails to start with the given message.
    pub(crate) fn failing(message: &str) -> Self {
        Self::new(&[], Some(message.to_string()), false)
    }

    /// A sandbox whose "container" never exits.
    pub(crate) fn hanging() -> Self {
        Self::new(&[], None, true)
    }

    /// Shared counter of how many times `run` was invoked.
    pub(crate) fn call_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Shared counter of how many times `reap` was invoked.
    pub(crate) fn reap_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.reaps)
    }
}

#[async_trait]
impl Sandbox for MockSandbox {
    async fn run(&self, spec: &SandboxSpec) -> Result<(), SandboxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.hang {
            std::future::pending::<()>().await;
        }

        if let Some(message) = &self.failure {
            return Err(SandboxError::start_failed(message.clone()));
        }

        for (name, contents) in &self.files {
            fs::write(spec.workspace.join(name), contents)
                .map_err(|e| SandboxError::wait_failed(e.to_string()))?;
        }
        Ok(())
    }

    async fn reap(&self, _spec: &SandboxSpec) {
        self.reaps.fetch_add(1, Ordering::SeqCst);
    }
}
