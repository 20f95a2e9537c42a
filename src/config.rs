use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILE: &str = "coderund.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Shared secret every request must carry in its `usst` field
    #[serde(default = "default_secret")]
    pub secret: String,

    /// How many sandboxes may run at the same time
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            secret: default_secret(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Where per-request workspaces are created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory that holds the per-request workspaces
    #[serde(default = "default_workspace_root")]
    pub root: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
        }
    }
}

/// Sandbox container policy. Every field is fixed at startup; request
/// content never reaches any of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Docker image to use
    #[serde(default = "default_image")]
    pub image: String,

    /// Entrypoint command run inside the container
    #[serde(default = "default_command")]
    pub command: Vec<String>,

    /// Path the workspace is bind-mounted at inside the container
    #[serde(default = "default_mount_point")]
    pub mount_point: String,

    /// Memory limit (e.g. "256m", "1g")
    #[serde(default = "default_memory")]
    pub memory: String,

    /// CPU limit in cores (e.g. "0.2")
    #[serde(default = "default_cpus")]
    pub cpus: String,

    /// Hard deadline on container execution, in seconds
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            command: default_command(),
            mount_point: default_mount_point(),
            memory: default_memory(),
            cpus: default_cpus(),
            wait_timeout_secs: default_wait_timeout(),
        }
    }
}

// Default value functions
fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_secret() -> String {
    "1906".to_string()
}

fn default_max_concurrent() -> usize {
    8
}

fn default_workspace_root() -> String {
    "tmp".to_string()
}

fn default_image() -> String {
    "code-runner".to_string()
}

fn default_command() -> Vec<String> {
    vec!["/scripts/start.sh".to_string()]
}

fn default_mount_point() -> String {
    "/sandbox".to_string()
}

fn default_memory() -> String {
    "256m".to_string()
}

fn default_cpus() -> String {
    "0.2".to_string()
}

fn default_wait_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from file, using defaults if not found
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(config)
    }
}
