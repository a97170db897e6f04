// SPDX-License-Identifier: MIT

//! Platform client (component C): a thin abstraction over the hosting
//! platform's CLI, grounded on `loom_tools/common/github.py` for exact
//! semantics and on `groblegark-oddjobs`'s adapter-trait-plus-CLI-wrapper
//! shape for the Rust idiom.

mod gh;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use gh::GhPlatformClient;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePlatformClient, PlatformCall};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform command failed: {0}")]
    CommandFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Issue,
    Pr,
}

impl Entity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Pr => "pr",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListParams<'a> {
    pub labels: &'a [String],
    pub state: &'a str,
    pub fields: &'a [String],
    pub search: Option<&'a str>,
    pub head: Option<&'a str>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiStatus {
    Passing,
    Failing,
    Unknown,
}

/// Thin abstraction over the hosting-platform CLI: list/view issues and
/// PRs, edit labels, comment, close, query CI runs. Every non-zero exit
/// or I/O error yields the caller's own default rather than raising, per
/// spec §4.C and `loom_tools/common/state.py::parse_command_output`'s
/// try/except-to-default pattern.
#[async_trait]
pub trait PlatformClient: Send + Sync + 'static {
    /// List issues/PRs matching the given filters, returning
    /// `serde_json::Value` objects shaped by `fields` (empty `Vec` on any
    /// failure).
    async fn list(&self, entity: Entity, params: ListParams<'_>) -> Vec<serde_json::Value>;

    /// View a single issue/PR's requested fields (`None` on any failure).
    async fn view(&self, entity: Entity, number: u64, fields: &[String]) -> Option<serde_json::Value>;

    /// Edit labels on an issue/PR (best-effort; returns whether the
    /// underlying CLI call exited zero).
    async fn edit_labels(&self, entity: Entity, number: u64, add: &[String], remove: &[String]) -> bool;

    async fn comment(&self, entity: Entity, number: u64, body: &str) -> bool;

    async fn close(&self, entity: Entity, number: u64) -> bool;

    async fn merge_pr(&self, number: u64, cleanup: bool) -> bool;

    /// Fan out `queries` (each a list-style invocation) with a bounded
    /// worker pool, preserving input order, per spec §4.C.
    async fn list_many(&self, queries: Vec<(Entity, ListParams<'_>)>) -> Vec<Vec<serde_json::Value>>;

    /// Classify the default branch's CI health from its five most recent
    /// workflow runs, per spec §4.C / `gh_get_default_branch_ci_status`.
    async fn default_branch_ci_status(&self) -> CiStatus;
}
