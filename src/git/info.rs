//! Git metadata scraping over command output.

use std::path::Path;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use super::project::GitProject;
use crate::error::{ExecStreamError, Result};
use crate::execution::{Command, Executor, OutputFilter};

/// Default timeout for git commands.
const GIT_TIMEOUT: Duration = Duration::from_secs(20);

/// Run a git command and return its output with the preamble stripped.
pub async fn run_git(command_line: &str, cwd: Option<&Path>) -> Result<String> {
    run_git_with_timeout(command_line, cwd, GIT_TIMEOUT).await
}

async fn run_git_with_timeout(
    command_line: &str,
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<String> {
    debug!(command = command_line, "running git command");
    let mut command = Command::parse(command_line)?.timeout(timeout);
    if let Some(dir) = cwd {
        command = command.working_dir(dir);
    }
    let mut result = Executor::new().console(false).run(&command).await?;
    result.output_with(OutputFilter::process_output()).await
}

async fn run_git_lines(command_line: &str, cwd: Option<&Path>) -> Result<Vec<String>> {
    let output = run_git(command_line, cwd).await?;
    Ok(output.lines().map(str::to_owned).collect())
}

/// Hash of the current HEAD commit.
pub async fn head_hash(cwd: Option<&Path>) -> Result<String> {
    let lines = run_git_lines("git log --format=\"%H\" -n 1", cwd).await?;
    let hash = lines
        .last()
        .ok_or_else(|| ExecStreamError::Git("no HEAD hash in git log output".into()))?;
    Ok(hash.trim_matches('"').to_string())
}

/// Hash the given tag points at.
pub async fn tag_hash(tag: &str, cwd: Option<&Path>) -> Result<String> {
    let lines = run_git_lines(&format!("git rev-list {tag} --max-count=1 --"), cwd).await?;
    lines
        .last()
        .cloned()
        .ok_or_else(|| ExecStreamError::Git(format!("tag '{tag}' did not resolve to a hash")))
}

/// Author date of the given tag.
pub async fn tag_date(tag: &str, cwd: Option<&Path>) -> Result<String> {
    let lines = run_git_lines(&format!("git log -1 --format=%ai {tag}"), cwd).await?;
    lines
        .last()
        .cloned()
        .ok_or_else(|| ExecStreamError::Git(format!("tag '{tag}' has no date")))
}

/// Configured `remote.origin` URL.
pub async fn project_url(cwd: Option<&Path>) -> Result<String> {
    let lines = run_git_lines("git config remote.origin.url", cwd).await?;
    lines
        .last()
        .cloned()
        .ok_or_else(|| ExecStreamError::Git("remote.origin.url is not configured".into()))
}

/// Extract `group/name` from a remote URL, dropping a `.git` suffix.
pub fn project_full_name(url: &str) -> Option<String> {
    let pattern = Regex::new(r"(?:ssh|http|https)://.*(?:(?::\d*)|(?:\.\w{3}))/(.*)").ok()?;
    let captured = pattern.captures(url)?.get(1)?.as_str();
    Some(captured.trim_end_matches(".git").to_string())
}

/// Whether the working tree has uncommitted changes.
pub async fn has_changes(cwd: Option<&Path>) -> Result<bool> {
    let output = run_git("git status", cwd).await?;
    Ok(!output.contains("nothing to commit, working tree clean"))
}

/// Most recent tag, or `None` when the repository has no tags.
pub async fn last_tag(cwd: Option<&Path>) -> Result<Option<String>> {
    let tags = run_git_lines("git tag --list", cwd).await?;
    if tags.is_empty() {
        return Ok(None);
    }
    let described = run_git_lines("git describe --abbrev=0", cwd).await?;
    Ok(described.last().cloned())
}

/// Branch containing `current_hash`.
///
/// When several branches contain the commit, `last_tag` breaks the tie
/// via longest-shared-prefix matching against the branch names.
pub async fn branch(
    current_hash: &str,
    last_tag: Option<&str>,
    cwd: Option<&Path>,
) -> Result<Option<String>> {
    let lines = run_git_lines(
        &format!("git branch -a --contains \"{current_hash}\""),
        cwd,
    )
    .await?;

    let mut names: Vec<String> = Vec::new();
    for line in &lines {
        if line.trim().is_empty() || line.contains("detached") {
            continue;
        }
        // remotes/origin/feature -> feature; "* master" -> master
        let name = match line.rfind('/') {
            Some(idx) => &line[idx + 1..],
            None => line.as_str(),
        };
        let name = name.trim_matches(|c| c == ' ' || c == '*').to_string();
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }

    match names.len() {
        0 => Ok(None),
        1 => Ok(names.pop()),
        _ => match last_tag {
            Some(tag) => Ok(Some(closest_name(&names, tag))),
            None => Ok(names.into_iter().next()),
        },
    }
}

/// Collect a full metadata snapshot for the repository at `cwd`.
pub async fn collect_info(cwd: &Path) -> Result<GitProject> {
    let head = head_hash(Some(cwd)).await?;
    let url = project_url(Some(cwd)).await.ok();
    let tag = last_tag(Some(cwd)).await.unwrap_or(None);
    let head_branch = branch(&head, tag.as_deref(), Some(cwd)).await?;
    let tag_hash = match &tag {
        Some(tag) => Some(self::tag_hash(tag, Some(cwd)).await?),
        None => None,
    };

    Ok(GitProject {
        full_path: Some(cwd.display().to_string()),
        full_name: url.as_deref().and_then(project_full_name),
        url,
        head_hash: Some(head),
        branch: head_branch,
        tag_hash,
        last_tag: tag,
        ..GitProject::default()
    })
}

/// Pick the name sharing the longest case-insensitive prefix with
/// `wanted`; a name matching the whole of `wanted` wins outright.
fn closest_name(names: &[String], wanted: &str) -> String {
    let wanted_len = wanted.chars().count();
    let mut best = wanted.to_string();
    let mut best_len = 0;

    for name in names {
        let shared = shared_prefix_len(name, wanted);
        if shared == wanted_len {
            return name.clone();
        }
        if shared > best_len && name.chars().count() < wanted_len {
            best_len = shared;
            best = name.clone();
        }
    }
    best
}

/// Length of the shared case-insensitive prefix. A trailing `_` on the
/// shared span does not count toward the score.
fn shared_prefix_len(a: &str, b: &str) -> usize {
    let mut count = 0;
    let mut last = None;
    for (x, y) in a.chars().zip(b.chars()) {
        if x.eq_ignore_ascii_case(&y) {
            count += 1;
            last = Some(x);
        } else {
            if last == Some('_') {
                count -= 1;
            }
            break;
        }
    }
    count
}
