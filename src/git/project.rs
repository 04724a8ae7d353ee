//! Git metadata records.

use serde::{Deserialize, Serialize};

/// Snapshot of a repository's git state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitProject {
    pub id: Option<String>,
    pub full_path: Option<String>,
    pub full_name: Option<String>,
    pub branch: Option<String>,
    pub parent: Option<String>,
    pub url: Option<String>,
    pub head_hash: Option<String>,
    pub tag_hash: Option<String>,
    pub last_tag: Option<String>,
    pub next_tag_hash: Option<String>,
    pub next_tag: Option<String>,
    pub short_summary: Option<String>,
    pub detailed_summary: Option<String>,
    pub submodules: Vec<GitSubmodule>,
    pub status: String,
}

impl Default for GitProject {
    fn default() -> Self {
        Self {
            id: None,
            full_path: None,
            full_name: None,
            branch: None,
            parent: None,
            url: None,
            head_hash: None,
            tag_hash: None,
            last_tag: None,
            next_tag_hash: None,
            next_tag: None,
            short_summary: None,
            detailed_summary: None,
            submodules: Vec::new(),
            status: "freeze".to_string(),
        }
    }
}

impl GitProject {
    /// Pretty-printed JSON form of the record.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A submodule entry inside a [`GitProject`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSubmodule {
    #[serde(flatten)]
    pub project: GitProject,
    pub name: Option<String>,
    pub path: Option<String>,
    pub relative_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_freeze() {
        let project = GitProject::default();
        assert_eq!(project.status, "freeze");
        assert!(project.submodules.is_empty());
    }

    #[test]
    fn test_to_json_contains_fields() {
        let project = GitProject {
            full_name: Some("group/repo".into()),
            branch: Some("main".into()),
            ..GitProject::default()
        };
        let json = project.to_json().unwrap();
        assert!(json.contains("\"full_name\": \"group/repo\""));
        assert!(json.contains("\"branch\": \"main\""));
    }

    #[test]
    fn test_json_roundtrip() {
        let project = GitProject {
            head_hash: Some("abc123".into()),
            ..GitProject::default()
        };
        let json = project.to_json().unwrap();
        let back: GitProject = serde_json::from_str(&json).unwrap();
        assert_eq!(back.head_hash.as_deref(), Some("abc123"));
        assert_eq!(back.status, "freeze");
    }
}
