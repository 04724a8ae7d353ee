//! # exec-stream
//!
//! Process execution engine with streamed output capture and timeout
//! enforcement.
//!
//! This crate is the execution substrate that CI tooling builds on: it
//! launches external processes, streams their combined stdout and stderr
//! into a sink (in-memory buffer or append-mode file) while optionally
//! echoing to the console, and enforces a wall-clock timeout that
//! forcibly kills a runaway process while keeping its partial output
//! readable.
//!
//! ## Features
//!
//! - **Streamed capture**: one background pump funnels both child pipes
//!   into the sink, flushing every line as it arrives
//! - **Timeout watchdog**: a cancellable timer raced against completion;
//!   a timed-out run still exposes command, output, and duration
//! - **Inspectable results**: exit code, timing, and filtered output
//!   views that strip the provenance preamble back out
//! - **Git metadata**: a thin scraper built on the runner contract
//!
//! ## Quick Start
//!
//! ```no_run
//! use exec_stream::{Command, Executor, OutputFilter, OutputTarget};
//!
//! #[tokio::main]
//! async fn main() -> exec_stream::Result<()> {
//!     // Initialize logging
//!     exec_stream::logging::try_init().ok();
//!
//!     // One-shot execution, captured in memory
//!     let mut result = exec_stream::run("echo hello").await?;
//!     assert_eq!(result.exit_code(), Some(0));
//!     println!("{}", result.output().await?);
//!
//!     // Full control: file target, no echo, bounded runtime
//!     let command = Command::parse("cargo build")?
//!         .working_dir("/project")
//!         .timeout(std::time::Duration::from_secs(600));
//!     let executor = Executor::new()
//!         .target(OutputTarget::file("logs/build.log"))
//!         .console(false);
//!     let mut result = executor.run(&command).await?;
//!
//!     println!("{}", result.output_with(OutputFilter::process_output()).await?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod execution;
pub mod git;
pub mod logging;
pub mod output;
pub mod workspace;

// Re-export commonly used types
pub use error::{ExecStreamError, Result};
pub use execution::{
    run, run_with_timeout, Command, ExecOutcome, ExecutionResult, Executor, OutputFilter,
    DEFAULT_TIMEOUT,
};
pub use git::{GitProject, GitSubmodule};
pub use output::{OutputSink, OutputTarget};
pub use workspace::Workspace;
