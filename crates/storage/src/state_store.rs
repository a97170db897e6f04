//! Typed read/write access to the JSON state files under `STATE/`, grounded
//! on `loom_tools/common/state.py`'s `read_daemon_state`/`read_progress_files`/
//! `read_health_metrics`/`read_alerts`/`read_stuck_history` wrapper family and
//! on the teacher's `oj-storage::checkpoint` temp-file-then-rename mechanics
//! (via [`crate::atomic`]).

use std::path::Path;

use loom_core::{AlertsFile, BaselineHealth, DaemonState, HealthMetrics, ShepherdProgress, StuckHistory};

use crate::atomic::{read_json_or_default, write_json_atomic, AtomicWriteError};
use crate::paths::LoomPaths;

/// Typed façade over the state directory. Every read tolerates a missing,
/// empty, or malformed file by returning the type's default — there is no
/// distinction between "never written" and "corrupt" anywhere in this API,
/// matching the original's `read_json_file`.
#[derive(Debug, Clone)]
pub struct StateStore {
    paths: LoomPaths,
}

impl StateStore {
    pub fn new(paths: LoomPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &LoomPaths {
        &self.paths
    }

    pub fn read_daemon_state(&self) -> DaemonState {
        read_json_or_default(&self.paths.daemon_state_file())
    }

    pub fn write_daemon_state(&self, state: &DaemonState) -> Result<(), AtomicWriteError> {
        write_json_atomic(&self.paths.daemon_state_file(), state)
    }

    pub fn read_progress(&self, task_id: &str) -> ShepherdProgress {
        let mut progress: ShepherdProgress = read_json_or_default(&self.paths.progress_file(task_id));
        if progress.task_id.is_empty() {
            progress.task_id = task_id.to_string();
        }
        progress
    }

    pub fn write_progress(&self, progress: &ShepherdProgress) -> Result<(), AtomicWriteError> {
        write_json_atomic(&self.paths.progress_file(&progress.task_id), progress)
    }

    /// Enumerate every persisted `ShepherdProgress` file, used by
    /// `check_completions` to scan for finished shepherds. Unreadable
    /// entries are skipped (best-effort, matching the original's directory
    /// scan which tolerates stray files).
    pub fn list_progress(&self) -> Vec<ShepherdProgress> {
        let dir = self.paths.progress_dir();
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .map(|e| read_json_or_default::<ShepherdProgress>(&e.path()))
            .collect()
    }

    pub fn delete_progress(&self, task_id: &str) {
        let _ = std::fs::remove_file(self.paths.progress_file(task_id));
    }

    pub fn read_baseline_health(&self) -> BaselineHealth {
        read_json_or_default(&self.paths.baseline_health_file())
    }

    pub fn write_baseline_health(&self, health: &BaselineHealth) -> Result<(), AtomicWriteError> {
        write_json_atomic(&self.paths.baseline_health_file(), health)
    }

    pub fn read_health_metrics(&self) -> HealthMetrics {
        read_json_or_default(&self.paths.health_metrics_file())
    }

    pub fn write_health_metrics(&self, metrics: &HealthMetrics) -> Result<(), AtomicWriteError> {
        write_json_atomic(&self.paths.health_metrics_file(), metrics)
    }

    pub fn read_alerts(&self) -> AlertsFile {
        read_json_or_default(&self.paths.alerts_file())
    }

    pub fn write_alerts(&self, alerts: &AlertsFile) -> Result<(), AtomicWriteError> {
        write_json_atomic(&self.paths.alerts_file(), alerts)
    }

    pub fn read_stuck_history(&self) -> StuckHistory {
        read_json_or_default(&self.paths.stuck_history_file())
    }

    pub fn write_stuck_history(&self, history: &StuckHistory) -> Result<(), AtomicWriteError> {
        write_json_atomic(&self.paths.stuck_history_file(), history)
    }

    /// Inbound command-signal files under `STATE/signals/`, sorted by file
    /// name (which encodes a monotonic ordinal), matching spec §4.H's
    /// "scanned in sorted name order each tick".
    pub fn list_signal_files(&self) -> Vec<std::path::PathBuf> {
        let dir = self.paths.signals_dir();
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        files
    }

    pub fn read_signal(&self, path: &Path) -> Option<serde_json::Value> {
        let raw = std::fs::read_to_string(path).ok()?;
        if raw.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&raw).ok()
    }

    /// Consume (delete) a signal file. Per spec §8's round-trip property,
    /// deletion is part of consumption, so a file cannot be processed twice.
    pub fn consume_signal(&self, path: &Path) {
        let _ = std::fs::remove_file(path);
    }
}

#[cfg(test)]
#[path = "state_store_tests.rs"]
mod tests;
