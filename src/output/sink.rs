//! Output sink: where streamed process output goes.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::{ExecStreamError, Result};

/// Where captured output goes, resolved once at sink-open time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Accumulate in an in-memory buffer.
    #[default]
    Memory,
    /// Append to the file at this path, creating parent directories as
    /// needed. Re-using the same path across runs accumulates output
    /// rather than truncating it.
    File(PathBuf),
}

impl OutputTarget {
    /// File target from anything path-like.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }
}

impl From<PathBuf> for OutputTarget {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

#[derive(Debug)]
enum Backend {
    Memory(String),
    File {
        path: PathBuf,
        handle: Option<File>,
    },
}

/// Destination that receives streamed process output.
///
/// Owns exactly one underlying destination — an in-memory buffer or an
/// open file handle. Every write is flushed immediately so a tailing
/// reader sees output promptly and a forced kill loses no buffered data.
#[derive(Debug)]
pub struct OutputSink {
    backend: Backend,
    echo: bool,
}

impl OutputSink {
    /// Open a sink for the given target.
    ///
    /// `echo` mirrors every write to standard output.
    pub async fn open(target: OutputTarget, echo: bool) -> Result<Self> {
        let backend = match target {
            OutputTarget::Memory => Backend::Memory(String::new()),
            OutputTarget::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
                let handle = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .await?;
                Backend::File {
                    path,
                    handle: Some(handle),
                }
            }
        };
        Ok(Self { backend, echo })
    }

    /// Whether writes are echoed to standard output.
    pub fn echoes(&self) -> bool {
        self.echo
    }

    /// Path of a file-backed sink, `None` for in-memory sinks.
    pub fn path(&self) -> Option<&Path> {
        match &self.backend {
            Backend::File { path, .. } => Some(path),
            Backend::Memory(_) => None,
        }
    }

    /// Write text to the sink and flush it.
    ///
    /// Empty writes are ignored. With echo on, the same bytes go to
    /// standard output first.
    pub async fn write(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        if self.echo {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
        match &mut self.backend {
            Backend::Memory(buffer) => buffer.push_str(text),
            Backend::File {
                handle: Some(file), ..
            } => {
                file.write_all(text.as_bytes()).await?;
                file.flush().await?;
            }
            Backend::File { handle: None, .. } => return Err(ExecStreamError::SinkClosed),
        }
        Ok(())
    }

    /// Return the full accumulated text.
    ///
    /// File-backed sinks read the file fresh on every call; in-memory
    /// sinks return the buffer. Callers that need a stable snapshot cache
    /// the answer ([`ExecutionResult::output`](crate::ExecutionResult::output)
    /// does).
    pub async fn materialize(&self) -> Result<String> {
        match &self.backend {
            Backend::Memory(buffer) => Ok(buffer.clone()),
            Backend::File { path, .. } => Ok(tokio::fs::read_to_string(path).await?),
        }
    }

    /// Release the underlying file handle.
    ///
    /// Idempotent. In-memory sinks are unaffected; a closed file sink
    /// rejects further writes but its content stays readable through
    /// [`materialize`](Self::materialize).
    pub async fn close(&mut self) -> Result<()> {
        if let Backend::File { handle, .. } = &mut self.backend {
            if let Some(mut file) = handle.take() {
                file.flush().await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_sink_roundtrip() {
        let mut sink = OutputSink::open(OutputTarget::Memory, false).await.unwrap();
        sink.write("line one\n").await.unwrap();
        sink.write("line two\n").await.unwrap();

        assert_eq!(sink.materialize().await.unwrap(), "line one\nline two\n");
        assert!(sink.path().is_none());
    }

    #[tokio::test]
    async fn test_empty_write_is_ignored() {
        let mut sink = OutputSink::open(OutputTarget::Memory, false).await.unwrap();
        sink.write("").await.unwrap();
        assert_eq!(sink.materialize().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_file_sink_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep/nested/out.log");

        let mut sink = OutputSink::open(OutputTarget::file(&path), false)
            .await
            .unwrap();
        sink.write("hello\n").await.unwrap();

        assert!(path.exists());
        assert_eq!(sink.materialize().await.unwrap(), "hello\n");
    }

    #[tokio::test]
    async fn test_file_sink_appends_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");

        let mut first = OutputSink::open(OutputTarget::file(&path), false)
            .await
            .unwrap();
        first.write("first\n").await.unwrap();
        first.close().await.unwrap();

        let mut second = OutputSink::open(OutputTarget::file(&path), false)
            .await
            .unwrap();
        second.write("second\n").await.unwrap();

        assert_eq!(second.materialize().await.unwrap(), "first\nsecond\n");
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");

        let mut sink = OutputSink::open(OutputTarget::file(&path), false)
            .await
            .unwrap();
        sink.write("data\n").await.unwrap();
        sink.close().await.unwrap();
        sink.close().await.unwrap();

        assert_eq!(sink.materialize().await.unwrap(), "data\n");
    }

    #[tokio::test]
    async fn test_write_after_close_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");

        let mut sink = OutputSink::open(OutputTarget::file(&path), false)
            .await
            .unwrap();
        sink.close().await.unwrap();

        let err = sink.write("late\n").await.unwrap_err();
        assert!(matches!(err, ExecStreamError::SinkClosed));
    }

    #[test]
    fn test_target_from_pathbuf() {
        let target: OutputTarget = PathBuf::from("/tmp/x.log").into();
        assert_eq!(target, OutputTarget::file("/tmp/x.log"));
        assert_eq!(OutputTarget::default(), OutputTarget::Memory);
    }
}
