//! Output capture.
//!
//! This module owns the destination side of a run:
//! - In-memory buffer or append-mode file targets
//! - Immediate flush on every write
//! - Optional console echo of the captured bytes
//!
//! # Example
//!
//! ```no_run
//! use exec_stream::output::{OutputSink, OutputTarget};
//!
//! # async fn demo() -> exec_stream::Result<()> {
//! let mut sink = OutputSink::open(OutputTarget::file("logs/build.log"), false).await?;
//! sink.write("running in /work\n").await?;
//! let text = sink.materialize().await?;
//! # Ok(())
//! # }
//! ```

mod sink;

pub use sink::{OutputSink, OutputTarget};
