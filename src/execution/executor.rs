//! Process runner: spawn, output pump, timeout watchdog.

use std::process::Stdio;
use std::time::{Duration, Instant, SystemTime};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout};
use tracing::{debug, warn};

use super::command::Command;
use super::result::{ExecOutcome, ExecutionResult, CWD_PREAMBLE};
use crate::error::{ExecStreamError, Result};
use crate::output::{OutputSink, OutputTarget};

/// Default wall-clock limit for a run: two hours.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(7_200);

/// Process runner.
///
/// Spawns the child with stdout and stderr piped, writes a two-line
/// provenance preamble into the sink (working directory, then the joined
/// command), pumps both pipes into the sink from a single background
/// task, and races completion against a timeout watchdog that kills a
/// runaway process.
#[derive(Debug, Clone)]
pub struct Executor {
    target: OutputTarget,
    console: bool,
    check_output: bool,
}

impl Executor {
    /// New runner: in-memory capture, console echo on, no escalation.
    pub fn new() -> Self {
        Self {
            target: OutputTarget::Memory,
            console: true,
            check_output: false,
        }
    }

    /// Set where captured output goes.
    pub fn target(mut self, target: impl Into<OutputTarget>) -> Self {
        self.target = target.into();
        self
    }

    /// Set whether captured output is echoed to standard output.
    pub fn console(mut self, echo: bool) -> Self {
        self.console = echo;
        self
    }

    /// Set whether [`run`](Self::run) escalates a timed-out run.
    pub fn check_output(mut self, check: bool) -> Self {
        self.check_output = check;
        self
    }

    /// Execute a command to completion or forced kill.
    ///
    /// Returns [`ExecOutcome::Completed`] when the child exits on its own
    /// (any exit code) and [`ExecOutcome::TimedOut`] when the watchdog
    /// killed it; both carry the finalized [`ExecutionResult`]. A spawn
    /// failure is a hard [`ExecStreamError::Spawn`] error — the sink keeps
    /// whatever preamble was already written, but no result exists.
    pub async fn execute(&self, command: &Command) -> Result<ExecOutcome> {
        let cwd = match &command.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let timeout = command.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let mut sink = OutputSink::open(self.target.clone(), self.console).await?;
        sink.write(&format!("{CWD_PREAMBLE}{}\n", cwd.display()))
            .await?;
        sink.write(&format!("{command}\n")).await?;

        let mut child = tokio::process::Command::new(command.program())
            .args(command.args())
            .envs(&command.env)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecStreamError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let started_at = SystemTime::now();
        let started = Instant::now();
        debug!(
            command = %command,
            cwd = %cwd.display(),
            timeout_secs = timeout.as_secs(),
            "spawned process"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExecStreamError::Pump("child stdout not piped".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExecStreamError::Pump("child stderr not piped".into()))?;

        // Single writer for the whole run; the sink comes back when both
        // pipes reach end-of-stream.
        let pump = tokio::spawn(pump_output(stdout, stderr, sink));

        // The timeout wrapper is the watchdog: a natural exit drops the
        // timer with it, so there is no disarm gap on any path out of
        // this function.
        let (status, timed_out) = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => (status?, false),
            Err(_elapsed) => {
                warn!(
                    command = %command,
                    timeout_secs = timeout.as_secs(),
                    "timeout elapsed, killing process"
                );
                child.start_kill()?;
                (child.wait().await?, true)
            }
        };

        // Killing the child closes its pipes, so draining ends on its own.
        let sink = pump
            .await
            .map_err(|join_err| ExecStreamError::Pump(join_err.to_string()))??;

        let duration = started.elapsed();
        let exit_code = status.code();
        debug!(
            command = %command,
            exit_code = ?exit_code,
            timed_out,
            duration_ms = duration.as_millis() as u64,
            "process finished"
        );

        let result = ExecutionResult::new(command.to_string(), sink, started_at)
            .with_exit_code(exit_code)
            .with_timing(duration)
            .with_timed_out(timed_out);

        Ok(if timed_out {
            ExecOutcome::TimedOut(result)
        } else {
            ExecOutcome::Completed(result)
        })
    }

    /// Execute and apply the check-output escalation policy.
    ///
    /// Escalates [`ExecStreamError::Timeout`] (boxing the result, so the
    /// partial output stays readable) only when the check-output flag is
    /// set, the exit code is non-zero, and the run was killed by the
    /// watchdog. A plain non-zero exit is never escalated here — it is
    /// reported through [`ExecutionResult::exit_code`] and the decision
    /// belongs to the caller.
    pub async fn run(&self, command: &Command) -> Result<ExecutionResult> {
        match self.execute(command).await? {
            ExecOutcome::Completed(result) => Ok(result),
            ExecOutcome::TimedOut(result) => {
                if self.check_output && result.exit_code() != Some(0) {
                    Err(ExecStreamError::Timeout(Box::new(result)))
                } else {
                    Ok(result)
                }
            }
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

/// Funnel both child pipes into the sink until end-of-stream.
///
/// One task, one writer: lines land in the order the reads complete and
/// every line is flushed as it arrives, so the console echo and the
/// captured text stay in step with the child.
async fn pump_output(
    stdout: ChildStdout,
    stderr: ChildStderr,
    mut sink: OutputSink,
) -> Result<OutputSink> {
    let mut out_lines = BufReader::new(stdout).lines();
    let mut err_lines = BufReader::new(stderr).lines();
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            line = out_lines.next_line(), if out_open => match line? {
                Some(line) => sink.write(&format!("{line}\n")).await?,
                None => out_open = false,
            },
            line = err_lines.next_line(), if err_open => match line? {
                Some(line) => sink.write(&format!("{line}\n")).await?,
                None => err_open = false,
            },
        }
    }
    Ok(sink)
}

/// Run a command line with default settings: in-memory capture, console
/// echo on, default timeout.
pub async fn run(command_line: &str) -> Result<ExecutionResult> {
    let command = Command::parse(command_line)?;
    Executor::new().run(&command).await
}

/// Run a command line with an explicit timeout.
pub async fn run_with_timeout(command_line: &str, timeout: Duration) -> Result<ExecutionResult> {
    let command = Command::parse(command_line)?.timeout(timeout);
    Executor::new().run(&command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::OutputFilter;

    #[test]
    fn test_default_timeout() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(7_200));
    }

    #[tokio::test]
    async fn test_execute_echo() {
        let command = Command::parse("echo hello").unwrap();
        let outcome = Executor::new()
            .console(false)
            .execute(&command)
            .await
            .unwrap();

        assert!(!outcome.timed_out());
        assert_eq!(outcome.exit_code(), Some(0));

        let mut result = outcome.into_result();
        let lines = result
            .output_lines_with(OutputFilter::process_output())
            .await
            .unwrap();
        assert_eq!(lines, ["hello"]);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_distinguishable() {
        let command = Command::parse("definitely-not-a-real-binary-xyz --flag").unwrap();
        let err = Executor::new()
            .console(false)
            .execute(&command)
            .await
            .unwrap_err();

        assert!(matches!(err, ExecStreamError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_env_override_reaches_child() {
        let command = Command::parse("sh -c \"echo $MARKER\"")
            .unwrap()
            .env("MARKER", "override-landed");
        let mut result = Executor::new()
            .console(false)
            .run(&command)
            .await
            .unwrap();

        let output = result
            .output_with(OutputFilter::process_output())
            .await
            .unwrap();
        assert_eq!(output, "override-landed");
    }

    #[tokio::test]
    async fn test_stderr_is_merged_into_capture() {
        let command = Command::parse("sh -c \"echo out; echo err 1>&2\"").unwrap();
        let mut result = Executor::new()
            .console(false)
            .run(&command)
            .await
            .unwrap();

        let output = result.output().await.unwrap();
        assert!(output.contains("out"));
        assert!(output.contains("err"));
    }
}
