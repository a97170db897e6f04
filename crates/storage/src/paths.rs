//! Path resolution for the per-repository state directory (`STATE/` =
//! `<repo>/.loom/`), grounded on spec §6's state-directory layout and on
//! `loom-tools/common/claude_config.py`'s use of a `LoomPaths`-shaped helper
//! for per-agent config directories.

use std::path::{Path, PathBuf};

/// All file/directory paths Loom reads or writes, rooted at a repository's
/// `.loom/` state directory.
#[derive(Debug, Clone)]
pub struct LoomPaths {
    repo_root: PathBuf,
}

impl LoomPaths {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn state_dir(&self) -> PathBuf {
        self.repo_root.join(".loom")
    }

    pub fn daemon_state_file(&self) -> PathBuf {
        self.state_dir().join("daemon-state.json")
    }

    pub fn pid_file(&self) -> PathBuf {
        self.state_dir().join("daemon-loop.pid")
    }

    pub fn log_file(&self) -> PathBuf {
        self.state_dir().join("daemon.log")
    }

    pub fn metrics_file(&self) -> PathBuf {
        self.state_dir().join("daemon-metrics.json")
    }

    pub fn stop_signal_file(&self) -> PathBuf {
        self.state_dir().join("stop-daemon")
    }

    pub fn signals_dir(&self) -> PathBuf {
        self.state_dir().join("signals")
    }

    pub fn progress_dir(&self) -> PathBuf {
        self.state_dir().join("progress")
    }

    pub fn progress_file(&self, task_id: &str) -> PathBuf {
        self.progress_dir().join(format!("shepherd-{task_id}.json"))
    }

    pub fn baseline_health_file(&self) -> PathBuf {
        self.state_dir().join("baseline-health.json")
    }

    pub fn health_metrics_file(&self) -> PathBuf {
        self.state_dir().join("health-metrics.json")
    }

    pub fn alerts_file(&self) -> PathBuf {
        self.state_dir().join("alerts.json")
    }

    pub fn stuck_history_file(&self) -> PathBuf {
        self.state_dir().join("stuck-history.json")
    }

    pub fn claude_config_base_dir(&self) -> PathBuf {
        self.state_dir().join("claude-config")
    }

    pub fn agent_claude_config_dir(&self, name: &str) -> PathBuf {
        self.claude_config_base_dir().join(name)
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
