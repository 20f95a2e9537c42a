//! Reads the artifacts the sandboxed toolchain leaves in the workspace.
//!
//! The contract with the in-container toolchain is file-based: a
//! structured result document plus two phase logs, all at fixed paths
//! under the mount point. The result document is load-bearing; the logs
//! are diagnostic only and degrade to empty strings when missing.

use serde::Serialize;

use crate::workspace::Workspace;

/// Structured result document the toolchain must produce on success.
pub const DUMP_FILE: &str = "dump.json";

/// Compile-phase log, best-effort.
pub const COMPILE_LOG: &str = "compile.log";

/// Run-phase log, best-effort.
pub const RUN_LOG: &str = "run.log";

/// Why the structured result could not be harvested.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// The result document is absent or unreadable; the sandboxed process
    /// crashed or never got that far.
    #[error("empty result")]
    Missing,

    /// The result document exists but is not valid JSON.
    #[error("malformed result")]
    Malformed(#[source] serde_json::Error),
}

/// Compile and run logs, always present in the response.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Logs {
    pub compile: String,
    pub run: String,
}

/// Reads and parses the structured result document.
///
/// The content is opaque to the orchestrator and relayed verbatim to the
/// caller; only readability and JSON well-formedness are checked.
pub fn harvest(workspace: &Workspace) -> Result<serde_json::Value, HarvestError> {
    let raw = workspace
        .read_file(DUMP_FILE)
        .map_err(|_| HarvestError::Missing)?;
    serde_json::from_str(&raw).map_err(HarvestError::Malformed)
}

/// Reads the two phase logs, substituting empty strings for anything that
/// cannot be read.
pub fn read_logs(workspace: &Workspace) -> Logs {
    Logs {
        compile: workspace.read_file(COMPILE_LOG).unwrap_or_default(),
        run: workspace.read_file(RUN_LOG).unwrap_or_default(),
    }
}
