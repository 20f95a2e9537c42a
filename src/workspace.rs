//! Per-request workspace directories.
//!
//! Each request gets a uniquely named, owner-only directory that bridges
//! the server and the sandbox via a bind mount. The directory is removed
//! on every exit path, so no untrusted input outlives its request.

use std::fs;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

/// File the untrusted source code is written to inside the workspace.
pub const CODE_FILE: &str = "code.c";

/// File the untrusted stdin payload is written to inside the workspace.
pub const STDIN_FILE: &str = "stdin";

/// Errors that can occur while managing a workspace.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// The workspace directory could not be created.
    #[error("failed to create workspace {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file could not be written into the workspace.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A uniquely named scratch directory owned by exactly one in-flight
/// request.
///
/// Dropping the workspace removes the directory and everything in it.
/// Cleanup is not optional: the sandbox writes untrusted output here and
/// a leaked workspace would accumulate attacker-controlled files on the
/// host.
#[derive(Debug)]
pub struct Workspace {
    id: Uuid,
    path: PathBuf,
}

impl Workspace {
    /// Creates a fresh workspace directory under `root` with owner-only
    /// permissions.
    ///
    /// The root directory itself is created if it does not exist yet.
    pub fn acquire(root: &Path) -> Result<Self, WorkspaceError> {
        let id = Uuid::new_v4();
        let path = root.join(format!("coderun-{id}"));

        fs::create_dir_all(root).map_err(|source| WorkspaceError::Create {
            path: root.to_path_buf(),
            source,
        })?;

        // Owner-only from the first instant: the sandbox runs as our uid,
        // nothing else on the host gets to see the submission.
        fs::DirBuilder::new()
            .mode(0o700)
            .create(&path)
            .map_err(|source| WorkspaceError::Create {
                path: path.clone(),
                source,
            })?;

        debug!(workspace = %path.display(), "acquired workspace");
        Ok(Self { id, path })
    }

    /// Writes the two untrusted payloads verbatim into the workspace.
    ///
    /// The contents are opaque bytes as far as this process is concerned;
    /// they are never parsed, logged, or executed outside the sandbox.
    pub fn write_inputs(&self, code: &str, stdin: &str) -> Result<(), WorkspaceError> {
        for (name, contents) in [(CODE_FILE, code), (STDIN_FILE, stdin)] {
            let path = self.path.join(name);
            fs::write(&path, contents)
                .map_err(|source| WorkspaceError::Write { path, source })?;
        }
        Ok(())
    }

    /// The workspace's unique identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Host path of the workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads a file from the workspace, if present.
    pub fn read_file(&self, name: &str) -> std::io::Result<String> {
        fs::read_to_string(self.path.join(name))
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(workspace = %self.path.display(), "released workspace"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(workspace = %self.path.display(), error = %e, "failed to remove workspace");
            }
        }
    }
}
