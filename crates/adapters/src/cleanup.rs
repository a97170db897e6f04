// SPDX-License-Identifier: MIT

//! Best-effort external cleanup collaborator, invoked after
//! `check_completions` updates state for a finished shepherd, grounded 1:1
//! on `daemon_v2/actions/completions.py::_trigger_shepherd_cleanup`.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

use crate::subprocess::{run_with_timeout, CLEANUP_TIMEOUT};

const CLEANUP_BINARY: &str = "loom-daemon-cleanup";

/// Notifies an external collaborator that a shepherd finished, so it can do
/// things the core doesn't: worktree teardown, tmux socket GC, etc. Never
/// fails the caller — every implementation absorbs its own errors, per
/// spec §4.F "best-effort".
#[async_trait]
pub trait CompletionCleanup: Send + Sync + 'static {
    async fn shepherd_complete(&self, issue: u64);
}

/// Prefers a repo-local `.venv/bin/loom-daemon-cleanup` (matching the
/// original's Python-venv packaging) over a `PATH`-resolved binary; runs
/// neither if it can't find either, per `_trigger_shepherd_cleanup`'s
/// venv-then-PATH lookup.
#[derive(Debug, Clone)]
pub struct ProcessCompletionCleanup {
    repo_root: PathBuf,
}

impl ProcessCompletionCleanup {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self { repo_root: repo_root.into() }
    }

    fn resolve_binary(&self) -> Option<PathBuf> {
        let venv_local = self.repo_root.join(".venv").join("bin").join(CLEANUP_BINARY);
        if venv_local.is_file() {
            return Some(venv_local);
        }
        which::which(CLEANUP_BINARY).ok()
    }
}

#[async_trait]
impl CompletionCleanup for ProcessCompletionCleanup {
    async fn shepherd_complete(&self, issue: u64) {
        let Some(binary) = self.resolve_binary() else {
            return;
        };
        let mut cmd = Command::new(binary);
        cmd.arg("shepherd-complete").arg(issue.to_string());
        let _ = run_with_timeout(cmd, CLEANUP_TIMEOUT, "loom-daemon-cleanup").await;
    }
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Default)]
pub struct FakeCompletionCleanup {
    calls: std::sync::Arc<parking_lot::Mutex<Vec<u64>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeCompletionCleanup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notified_issues(&self) -> Vec<u64> {
        self.calls.lock().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl CompletionCleanup for FakeCompletionCleanup {
    async fn shepherd_complete(&self, issue: u64) {
        self.calls.lock().push(issue);
    }
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
