//! Command building and representation.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ExecStreamError, Result};

/// A command to be executed: the program token and its arguments.
///
/// The token sequence is never empty. A single-string form is tokenized
/// before execution: plain whitespace splitting normally, shell-aware
/// splitting (quoted spans kept as single tokens) when the string
/// contains quotes.
#[derive(Debug, Clone)]
pub struct Command {
    tokens: Vec<String>,
    /// Working directory override (if any).
    pub working_dir: Option<PathBuf>,
    /// Environment overrides merged onto the inherited environment.
    pub env: HashMap<String, String>,
    /// Maximum execution time. The executor default applies when unset.
    pub timeout: Option<Duration>,
}

impl Command {
    /// Parse a command line into tokens.
    pub fn parse(command_line: &str) -> Result<Self> {
        let tokens: Vec<String> = if command_line.contains('"') || command_line.contains('\'') {
            shell_words::split(command_line)?
        } else {
            command_line
                .split_whitespace()
                .map(str::to_owned)
                .collect()
        };
        Self::from_tokens(tokens)
    }

    /// Build a command from pre-split tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(ExecStreamError::EmptyCommand);
        }
        Ok(Self {
            tokens,
            working_dir: None,
            env: HashMap::new(),
            timeout: None,
        })
    }

    /// The program token.
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// The argument tokens after the program.
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// The full token sequence.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add an environment override for the child process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Add multiple environment overrides.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.env.insert(k.into(), v.into());
        }
        self
    }

    /// Set the execution timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

impl fmt::Display for Command {
    /// Space-joined tokens — the form written into the sink preamble.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

impl FromStr for Command {
    type Err = ExecStreamError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let cmd = Command::parse("git log -n 1").unwrap();
        assert_eq!(cmd.program(), "git");
        assert_eq!(cmd.args(), ["log", "-n", "1"]);
        assert!(cmd.working_dir.is_none());
        assert!(cmd.env.is_empty());
        assert!(cmd.timeout.is_none());
    }

    #[test]
    fn test_parse_collapses_whitespace() {
        let cmd = Command::parse("echo   hello\tworld").unwrap();
        assert_eq!(cmd.tokens(), ["echo", "hello", "world"]);
    }

    #[test]
    fn test_parse_quoted_spans() {
        let cmd = Command::parse("git log --format=\"%H %s\" -n 1").unwrap();
        assert_eq!(
            cmd.tokens(),
            ["git", "log", "--format=%H %s", "-n", "1"]
        );
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(matches!(
            Command::parse("   "),
            Err(ExecStreamError::EmptyCommand)
        ));
    }

    #[test]
    fn test_parse_unbalanced_quote_is_error() {
        assert!(matches!(
            Command::parse("echo \"unmatched"),
            Err(ExecStreamError::CommandParse(_))
        ));
    }

    #[test]
    fn test_from_tokens_empty_is_error() {
        let tokens: Vec<String> = vec![];
        assert!(matches!(
            Command::from_tokens(tokens),
            Err(ExecStreamError::EmptyCommand)
        ));
    }

    #[test]
    fn test_builder_chain() {
        let cmd = Command::parse("cargo build")
            .unwrap()
            .working_dir("/project")
            .env("RUST_LOG", "debug")
            .timeout(Duration::from_secs(60));

        assert_eq!(cmd.working_dir, Some(PathBuf::from("/project")));
        assert_eq!(cmd.env.get("RUST_LOG"), Some(&"debug".to_string()));
        assert_eq!(cmd.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_envs() {
        let vars = [("KEY1", "val1"), ("KEY2", "val2")];
        let cmd = Command::parse("env").unwrap().envs(vars);

        assert_eq!(cmd.env.len(), 2);
        assert_eq!(cmd.env.get("KEY2"), Some(&"val2".to_string()));
    }

    #[test]
    fn test_display_joins_tokens() {
        let cmd = Command::parse("echo hello world").unwrap();
        assert_eq!(cmd.to_string(), "echo hello world");
    }

    #[test]
    fn test_from_str() {
        let cmd: Command = "ls -la".parse().unwrap();
        assert_eq!(cmd.program(), "ls");
    }
}
