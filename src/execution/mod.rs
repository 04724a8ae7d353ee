//! Process execution engine.
//!
//! This module is the core of the crate:
//! - Command tokenization and building
//! - Spawning with merged, streamed output capture
//! - Timeout watchdog that kills runaway processes
//! - Inspectable results with preamble-stripping filters
//!
//! # Example
//!
//! ```no_run
//! use exec_stream::execution::{run, run_with_timeout};
//! use std::time::Duration;
//!
//! # async fn demo() -> exec_stream::Result<()> {
//! // Simple one-shot execution
//! let mut result = run("echo hello").await?;
//! println!("{}", result.output().await?);
//!
//! // Bounded execution; a timed-out run is still inspectable
//! let result = run_with_timeout("sleep 60", Duration::from_secs(1)).await?;
//! assert!(result.timed_out());
//! # Ok(())
//! # }
//! ```

mod command;
mod executor;
mod result;

pub use command::Command;
pub use executor::{run, run_with_timeout, Executor, DEFAULT_TIMEOUT};
pub use result::{format_duration, ExecOutcome, ExecutionResult, OutputFilter};
