//! Git metadata collection.
//!
//! A thin consumer of the execution engine: runs git commands through the
//! runner contract, strips the provenance preamble with the output
//! filters, and scrapes the remaining text into metadata records.

mod info;
mod project;

pub use info::{
    branch, collect_info, has_changes, head_hash, last_tag, project_full_name, project_url,
    run_git, tag_date, tag_hash,
};
pub use project::{GitProject, GitSubmodule};
