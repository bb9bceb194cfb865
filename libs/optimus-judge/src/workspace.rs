/// Workspace cleanup guard - guarantees directory removal on drop
///
/// Each subprocess invocation gets its own uniquely named scratch directory
/// under the configured root. The directory is removed when the guard drops,
/// so every exit path (success, guest error, timeout, panic, early `?`
/// return) leaves nothing behind. Callers reap child processes before the
/// guard goes out of scope.
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

pub const WORKSPACE_PREFIX: &str = "optimus-";

pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace directory under `root`
    pub fn create(root: &Path) -> Result<Self> {
        let path = root.join(format!("{}{}", WORKSPACE_PREFIX, Uuid::new_v4()));
        fs::create_dir_all(&path)?;
        debug!(workspace = %path.display(), "Workspace created");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a file into the workspace and return its full path
    pub async fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let file = self.path.join(name);
        tokio::fs::write(&file, contents).await?;
        Ok(file)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        // Must complete before the owning call returns
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(workspace = %self.path.display(), "Workspace removed"),
            Err(e) => warn!(
                workspace = %self.path.display(),
                error = %e,
                "Failed to remove workspace"
            ),
        }
    }
}
