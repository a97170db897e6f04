// SPDX-License-Identifier: MIT

//! Detached child-process launcher for shepherd invocations (spec §4.F
//! "Spawn-shepherds" step 3): the daemon never waits on these children
//! synchronously, it only observes their effects through state files and
//! session existence (spec §5). Grounded on the teacher's
//! `CommandRunner`-shaped subprocess abstraction (REDESIGN FLAGS §9:
//! "Subprocess orchestration -> interface abstraction") so the daemon loop
//! can be tested without ever actually forking.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to spawn shepherd child: {0}")]
    SpawnFailed(String),
}

/// Spawns the shepherd program as a detached child, per spec §4.F step 3:
/// `<issue> --merge --allow-dirty-main --task-id <id>`, plus whatever
/// extra flags the caller (force mode, `--from`) adds. `--merge` is always
/// passed regardless of mode.
#[async_trait]
pub trait ShepherdLauncher: Send + Sync + 'static {
    async fn spawn_shepherd(
        &self,
        issue: u64,
        task_id: &str,
        extra_args: &[String],
        cwd: &Path,
    ) -> Result<(), LaunchError>;
}

/// Production launcher: re-execs the current binary under a hidden
/// `shepherd-run` subcommand, detached (stdio inherited, not waited on).
/// Grounded on the single-binary-with-internal-subcommand idiom rather than
/// inventing a second `loom-shepherd` binary the spec never names.
#[derive(Debug, Clone)]
pub struct ProcessShepherdLauncher {
    /// Path to the executable to re-exec; defaults to
    /// `std::env::current_exe()` at construction time.
    exe: PathBuf,
}

impl ProcessShepherdLauncher {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            exe: std::env::current_exe()?,
        })
    }

    pub fn with_exe(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }
}

#[async_trait]
impl ShepherdLauncher for ProcessShepherdLauncher {
    async fn spawn_shepherd(
        &self,
        issue: u64,
        task_id: &str,
        extra_args: &[String],
        cwd: &Path,
    ) -> Result<(), LaunchError> {
        let mut cmd = tokio::process::Command::new(&self.exe);
        cmd.arg("shepherd-run")
            .arg(issue.to_string())
            .arg("--merge")
            .arg("--allow-dirty-main")
            .arg("--task-id")
            .arg(task_id)
            .args(extra_args)
            .current_dir(cwd)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        cmd.spawn().map_err(|e| LaunchError::SpawnFailed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone)]
pub struct LaunchCall {
    pub issue: u64,
    pub task_id: String,
    pub extra_args: Vec<String>,
}

/// In-memory fake launcher for action-executor tests: records every
/// invocation instead of forking, and can be told to fail the next N
/// spawns (spec §4.F step 4: "if the child cannot be launched, revert the
/// claim").
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Default)]
pub struct FakeShepherdLauncher {
    calls: Arc<Mutex<Vec<LaunchCall>>>,
    fail_next: Arc<Mutex<usize>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeShepherdLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<LaunchCall> {
        self.calls.lock().clone()
    }

    /// The next `n` calls to `spawn_shepherd` fail instead of succeeding.
    pub fn fail_next_spawns(&self, n: usize) {
        *self.fail_next.lock() = n;
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl ShepherdLauncher for FakeShepherdLauncher {
    async fn spawn_shepherd(
        &self,
        issue: u64,
        task_id: &str,
        extra_args: &[String],
        _cwd: &Path,
    ) -> Result<(), LaunchError> {
        let mut remaining = self.fail_next.lock();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(LaunchError::SpawnFailed("fake launcher forced failure".into()));
        }
        drop(remaining);
        self.calls.lock().push(LaunchCall {
            issue,
            task_id: task_id.to_string(),
            extra_args: extra_args.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;
