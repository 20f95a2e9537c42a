//! `coderund` accepts untrusted C submissions over HTTP and runs them in
//! hardened, auto-removed Docker containers, relaying the structured
//! trace the in-container toolchain writes to the shared workspace.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod harvest;
mod sandbox;
mod server;
mod workspace;

#[derive(Parser)]
#[command(name = "coderund")]
#[command(
    author,
    version,
    about = "Runs untrusted C submissions in hardened Docker sandboxes"
)]
struct Cli {
    /// Project directory holding coderund.toml and the workspace root
    #[arg(short, long, default_value = ".")]
    project_dir: PathBuf,

    /// Override the configured bind address
    #[arg(short, long, env = "CODERUND_BIND")]
    bind: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("coderund=debug")
    } else {
        EnvFilter::new("coderund=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = config::Config::load(&cli.project_dir)?;
    let policy = sandbox::SandboxPolicy::from_config(&config.sandbox)?;
    let docker = sandbox::DockerSandbox::connect().await?;

    let workspace_root = cli.project_dir.join(&config.workspace.root);
    let bind = cli.bind.unwrap_or_else(|| config.server.bind.clone());

    let state = Arc::new(server::AppState::new(
        &config.server,
        workspace_root,
        policy,
        Box::new(docker),
    ));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!("listening on {bind}");

    axum::serve(listener, server::router(state))
        .await
        .context("Server error")?;

    Ok(())
}
