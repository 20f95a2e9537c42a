//! HTTP endpoint and request orchestration.
//!
//! One endpoint, `POST /run`, drives the whole pipeline: authorize,
//! acquire a workspace, stage the untrusted inputs, run the sandbox,
//! harvest the artifacts, and answer. Every outcome is reported in-band
//! as HTTP 200 with a uniform envelope; the workspace is destroyed on
//! every path.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::harvest::{self, HarvestError, Logs};
use crate::sandbox::{Sandbox, SandboxError, SandboxPolicy};
use crate::workspace::{Workspace, WorkspaceError};

/// Shared state behind the endpoint.
pub struct AppState {
    secret: String,
    workspace_root: PathBuf,
    policy: SandboxPolicy,
    sandbox: Box<dyn Sandbox>,
    limiter: Semaphore,
}

impl AppState {
    /// Assembles the server state.
    ///
    /// `max_concurrent` from the config bounds how many sandboxes may run
    /// at once; requests past the cap queue on the semaphore.
    pub fn new(
        config: &ServerConfig,
        workspace_root: PathBuf,
        policy: SandboxPolicy,
        sandbox: Box<dyn Sandbox>,
    ) -> Self {
        Self {
            secret: config.secret.clone(),
            workspace_root,
            policy,
            sandbox,
            limiter: Semaphore::new(config.max_concurrent),
        }
    }
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new().route("/run", post(execute)).with_state(state)
}

/// Incoming execution request.
///
/// `code` and `stdin` are opaque untrusted bytes; they are written into
/// the workspace verbatim and never interpreted by this process.
#[derive(Debug, Default, Deserialize)]
pub struct ExecuteRequest {
    /// Shared-secret token
    #[serde(default)]
    pub usst: String,
    /// Untrusted source code
    #[serde(default)]
    pub code: String,
    /// Untrusted stdin payload
    #[serde(default)]
    pub stdin: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Success,
    Error,
}

/// The response body, identical in shape for every outcome.
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    logs: Logs,
}

impl ResponseEnvelope {
    fn success(data: serde_json::Value, logs: Logs) -> Self {
        Self {
            status: Status::Success,
            data: Some(data),
            message: None,
            logs,
        }
    }

    fn error(message: String, logs: Logs) -> Self {
        Self {
            status: Status::Error,
            data: None,
            message: Some(message),
            logs,
        }
    }
}

/// Everything that can fail between accepting a request and answering it.
///
/// All variants collapse to the same error envelope; only the message
/// differs. Log read failures are deliberately absent here, they degrade
/// to empty strings instead.
#[derive(Debug, thiserror::Error)]
enum ExecuteError {
    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error(transparent)]
    Harvest(#[from] HarvestError),
}

async fn execute(State(state): State<Arc<AppState>>, body: String) -> Json<ResponseEnvelope> {
    // The endpoint always answers 200 with an envelope. A body that does
    // not parse carries no valid secret, so it falls through the
    // authorization check like any other unauthenticated request.
    let request: ExecuteRequest = serde_json::from_str(&body).unwrap_or_default();
    Json(handle(&state, &request).await)
}

/// Runs one request end to end and always produces an envelope.
async fn handle(state: &AppState, request: &ExecuteRequest) -> ResponseEnvelope {
    // Authorization gates every side effect: an unauthorized caller
    // causes no workspace and no container.
    if request.usst != state.secret {
        warn!("rejected request with invalid secret");
        return ResponseEnvelope::error(ExecuteError::Unauthorized.to_string(), Logs::default());
    }

    let Ok(_permit) = state.limiter.acquire().await else {
        return ResponseEnvelope::error("service unavailable".to_string(), Logs::default());
    };

    let workspace = match Workspace::acquire(&state.workspace_root) {
        Ok(workspace) => workspace,
        Err(e) => {
            warn!(error = %e, "workspace acquisition failed");
            return ResponseEnvelope::error(e.to_string(), Logs::default());
        }
    };

    let outcome = run_sandboxed(state, &workspace, request).await;

    // Logs are merged into the envelope on every branch, and must be read
    // before the workspace teardown below.
    let logs = harvest::read_logs(&workspace);

    match outcome {
        Ok(data) => {
            info!(workspace = %workspace.id(), "execution succeeded");
            ResponseEnvelope::success(data, logs)
        }
        Err(e) => {
            info!(workspace = %workspace.id(), error = %e, "execution failed");
            ResponseEnvelope::error(e.to_string(), logs)
        }
        // `workspace` drops here: the directory is removed no matter
        // which branch was taken.
    }
}

async fn run_sandboxed(
    state: &AppState,
    workspace: &Workspace,
    request: &ExecuteRequest,
) -> Result<serde_json::Value, ExecuteError> {
    workspace.write_inputs(&request.code, &request.stdin)?;
    let spec = state.policy.build_spec(workspace);

    match tokio::time::timeout(spec.wait_timeout, state.sandbox.run(&spec)).await {
        Ok(result) => result?,
        Err(_) => {
            // The container is still running against a workspace that is
            // about to be destroyed; tear it down before returning.
            state.sandbox.reap(&spec).await;
            return Err(SandboxError::timeout(spec.wait_timeout).into());
        }
    }

    Ok(harvest::harvest(workspace)?)
}
