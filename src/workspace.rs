//! Workspace-relative logging.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Base directory for resolving relative log paths.
///
/// Passed explicitly to whatever needs one; its lifecycle belongs to the
/// caller's session instead of a process-wide variable.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Workspace rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path against the root. Absolute paths pass through.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Append a line to a log file under the workspace, creating parent
    /// directories as needed. With `console` set, the line is echoed to
    /// standard output as well.
    pub async fn write_log(
        &self,
        path: impl AsRef<Path>,
        content: &str,
        console: bool,
    ) -> Result<()> {
        if console {
            println!("{content}");
        }
        let path = self.resolve(path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(format!("{content}\n").as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_relative() {
        let ws = Workspace::new("/base");
        assert_eq!(ws.resolve("logs/run.log"), PathBuf::from("/base/logs/run.log"));
    }

    #[test]
    fn test_resolve_absolute_passes_through() {
        let ws = Workspace::new("/base");
        assert_eq!(ws.resolve("/other/run.log"), PathBuf::from("/other/run.log"));
    }

    #[tokio::test]
    async fn test_write_log_appends_and_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::new(dir.path());

        ws.write_log("logs/run.log", "first", false).await.unwrap();
        ws.write_log("logs/run.log", "second", false).await.unwrap();

        let content = tokio::fs::read_to_string(dir.path().join("logs/run.log"))
            .await
            .unwrap();
        assert_eq!(content, "first\nsecond\n");
    }
}
