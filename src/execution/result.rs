//! Execution result types.

use std::time::{Duration, SystemTime};

use crate::error::Result;
use crate::output::OutputSink;

/// First preamble line prefix; the second preamble line is the command.
pub(crate) const CWD_PREAMBLE: &str = "running in ";

/// Filters applied when reading captured output.
///
/// The sink content starts with a two-line provenance preamble (working
/// directory, then the joined command); these flags strip it back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFilter {
    /// Trim leading and trailing whitespace. On by default.
    pub strip: bool,
    /// Remove the first occurrence of the joined command string.
    pub exclude_command: bool,
    /// Drop the first line when it is the `running in <cwd>` line;
    /// no-op otherwise.
    pub exclude_cwd: bool,
}

impl Default for OutputFilter {
    fn default() -> Self {
        Self {
            strip: true,
            exclude_command: false,
            exclude_cwd: false,
        }
    }
}

impl OutputFilter {
    /// The sink content exactly as captured, untouched.
    pub fn raw() -> Self {
        Self {
            strip: false,
            exclude_command: false,
            exclude_cwd: false,
        }
    }

    /// Both preamble lines stripped: the child's own output only.
    pub fn process_output() -> Self {
        Self {
            strip: true,
            exclude_command: true,
            exclude_cwd: true,
        }
    }

    /// Set whitespace trimming.
    pub fn strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    /// Set command-line removal.
    pub fn exclude_command(mut self, exclude: bool) -> Self {
        self.exclude_command = exclude;
        self
    }

    /// Set working-directory line removal.
    pub fn exclude_cwd(mut self, exclude: bool) -> Self {
        self.exclude_cwd = exclude;
        self
    }
}

/// The record of one process invocation.
///
/// Owns the sink the run wrote into. Fields are fixed once execution
/// finishes; the output content is materialized on first read and cached,
/// so later changes to an underlying file do not change the answer.
#[derive(Debug)]
pub struct ExecutionResult {
    command: String,
    sink: OutputSink,
    exit_code: Option<i32>,
    started_at: SystemTime,
    finished_at: SystemTime,
    duration: Duration,
    timed_out: bool,
    content: Option<String>,
}

impl ExecutionResult {
    pub(crate) fn new(command: String, sink: OutputSink, started_at: SystemTime) -> Self {
        Self {
            command,
            sink,
            exit_code: None,
            started_at,
            finished_at: started_at,
            duration: Duration::ZERO,
            timed_out: false,
            content: None,
        }
    }

    pub(crate) fn with_exit_code(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }

    pub(crate) fn with_timing(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self.finished_at = self.started_at + duration;
        self
    }

    pub(crate) fn with_timed_out(mut self, timed_out: bool) -> Self {
        self.timed_out = timed_out;
        self
    }

    /// The space-joined command line this result describes.
    pub fn command_line(&self) -> &str {
        &self.command
    }

    /// Exit code of the child, `None` when it was killed by a signal.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Whether the run finished with exit code 0 inside the timeout.
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Whether the watchdog killed the process.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Wall-clock start of the run.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// Wall-clock end of the run.
    pub fn finished_at(&self) -> SystemTime {
        self.finished_at
    }

    /// Elapsed execution time.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Elapsed execution time as `HH:MM:SS` text.
    pub fn duration_display(&self) -> String {
        format_duration(self.duration)
    }

    /// The sink this run wrote into.
    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    /// Captured output with default filtering (whitespace trimmed).
    pub async fn output(&mut self) -> Result<String> {
        self.output_with(OutputFilter::default()).await
    }

    /// Captured output with explicit filtering.
    pub async fn output_with(&mut self, filter: OutputFilter) -> Result<String> {
        if self.content.is_none() {
            self.content = Some(self.sink.materialize().await?);
        }
        let base = self.content.as_deref().unwrap_or_default();

        let mut output = if filter.exclude_command {
            base.replacen(&self.command, "", 1)
        } else {
            base.to_owned()
        };

        if filter.exclude_cwd {
            let starts_with_preamble = output
                .lines()
                .next()
                .is_some_and(|line| line.starts_with(CWD_PREAMBLE));
            if starts_with_preamble {
                output = match output.split_once('\n') {
                    Some((_, rest)) => rest.to_owned(),
                    None => String::new(),
                };
            }
        }

        if filter.strip {
            output = output.trim().to_owned();
        }
        Ok(output)
    }

    /// Captured output split on line boundaries, default filtering.
    pub async fn output_lines(&mut self) -> Result<Vec<String>> {
        self.output_lines_with(OutputFilter::default()).await
    }

    /// Captured output split on line boundaries, explicit filtering.
    pub async fn output_lines_with(&mut self, filter: OutputFilter) -> Result<Vec<String>> {
        let output = self.output_with(filter).await?;
        Ok(output.lines().map(str::to_owned).collect())
    }
}

/// Terminal state of one invocation: the process either exited on its own
/// or was killed by the watchdog. Both carry the full result, so a timed
/// out run still exposes its command, partial output, and duration.
#[derive(Debug)]
pub enum ExecOutcome {
    /// The process exited on its own, with any exit code.
    Completed(ExecutionResult),
    /// The watchdog killed the process when the timeout elapsed.
    TimedOut(ExecutionResult),
}

impl ExecOutcome {
    /// The result, whichever way the run ended.
    pub fn result(&self) -> &ExecutionResult {
        match self {
            Self::Completed(result) | Self::TimedOut(result) => result,
        }
    }

    /// Mutable access to the result (output reads cache through `&mut`).
    pub fn result_mut(&mut self) -> &mut ExecutionResult {
        match self {
            Self::Completed(result) | Self::TimedOut(result) => result,
        }
    }

    /// Consume the outcome, keeping the result.
    pub fn into_result(self) -> ExecutionResult {
        match self {
            Self::Completed(result) | Self::TimedOut(result) => result,
        }
    }

    /// Whether this run was killed by the watchdog.
    pub fn timed_out(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }

    /// Exit code of the child, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        self.result().exit_code()
    }
}

/// Render a duration as `HH:MM:SS`, or `N day(s) HH:MM:SS` past a day.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    if days > 0 {
        format!("{days} day(s) {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}
