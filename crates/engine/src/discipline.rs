// SPDX-License-Identifier: MIT

//! Signal & session discipline (component H): PID file, stop-signal file,
//! daemon-session-id handoff, inbound command files — grounded 1:1 on
//! `loom_tools/daemon_v2/signals.py` and on `daemon_v2/context.py`'s
//! `pending_spawns` field for the inbound-command queue.

use std::path::Path;

use loom_core::daemon_state::PendingSpawn;
use loom_storage::{LoomPaths, StateStore};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisciplineError {
    #[error("another daemon is already running (pid {0})")]
    SessionConflict(u32),
}

/// A parsed `STATE/signals/*.json` command, per spec §4.H.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundCommand {
    StartOrchestration,
    StopOrchestration,
    SpawnShepherd {
        issue: u64,
        mode: Option<String>,
        flags: Vec<String>,
    },
    /// A signal file this process doesn't recognize — kept for visibility
    /// in logs, dropped (consumed) like any other signal.
    Unknown(String),
}

fn parse_command(value: &serde_json::Value) -> InboundCommand {
    let command = value.get("command").and_then(|v| v.as_str()).unwrap_or("");
    match command {
        "start_orchestration" => InboundCommand::StartOrchestration,
        "stop_orchestration" => InboundCommand::StopOrchestration,
        "spawn_shepherd" => {
            let issue = value.get("issue").and_then(|v| v.as_u64()).unwrap_or(0);
            let mode = value
                .get("mode")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let flags = value
                .get("flags")
                .and_then(|v| v.as_array())
                .map(|a| a.iter().filter_map(|f| f.as_str().map(str::to_string)).collect())
                .unwrap_or_default();
            InboundCommand::SpawnShepherd { issue, mode, flags }
        }
        other => InboundCommand::Unknown(other.to_string()),
    }
}

/// Checks whether a process with `pid` is alive, by sending signal 0, the
/// same liveness probe `os.kill(pid, 0)` performs in the original, per
/// spec §4.H.
#[cfg(unix)]
fn pid_is_alive(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid), None).is_ok()
}

#[cfg(not(unix))]
fn pid_is_alive(_pid: i32) -> bool {
    false
}

/// Owns the daemon's PID-file/stop-signal/session-id lifecycle for one
/// repository's `.loom/` state directory.
pub struct Discipline {
    paths: LoomPaths,
    session_id: String,
}

impl Discipline {
    pub fn new(paths: LoomPaths, session_id: impl Into<String>) -> Self {
        Self {
            paths,
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Default session id: `"{epoch_secs}-{pid}"`, per
    /// `daemon_v2/context.py::DaemonContext.session_id`.
    pub fn default_session_id(now_epoch_secs: i64) -> String {
        format!("{now_epoch_secs}-{}", std::process::id())
    }

    /// Startup check: if a prior PID file exists and that PID is alive,
    /// fail with `SessionConflict`. If the PID is dead or the file is
    /// malformed, remove it. Write the current PID, per spec §4.H.
    pub fn acquire_pid_file(&self) -> Result<(), DisciplineError> {
        let pid_file = self.paths.pid_file();
        if let Ok(contents) = std::fs::read_to_string(&pid_file) {
            if let Some(existing_pid) = contents.trim().parse::<u32>().ok() {
                if pid_is_alive(existing_pid as i32) {
                    return Err(DisciplineError::SessionConflict(existing_pid));
                }
            }
            let _ = std::fs::remove_file(&pid_file);
        }
        if let Some(parent) = pid_file.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = std::fs::write(&pid_file, std::process::id().to_string());
        Ok(())
    }

    pub fn release_pid_file(&self) {
        let _ = std::fs::remove_file(self.paths.pid_file());
    }

    /// Whether `STATE/stop-daemon` is present. Checked every tick per
    /// spec §4.I step 1.
    pub fn stop_signal_present(&self) -> bool {
        self.paths.stop_signal_file().exists()
    }

    pub fn remove_stop_signal(&self) {
        let _ = std::fs::remove_file(self.paths.stop_signal_file());
    }

    /// Compares the persisted `daemon_session_id` against this process's
    /// in-memory id; a mismatch means another daemon has taken over and
    /// this process should shut down cleanly, per spec §4.H.
    pub fn session_superseded(&self, store: &StateStore) -> bool {
        let state = store.read_daemon_state();
        !state.daemon_session_id.is_empty() && state.daemon_session_id != self.session_id
    }

    /// Drain `STATE/signals/` in sorted name order, consuming
    /// (deleting) each file as it is read, per spec §4.H and the
    /// round-trip property in §8 ("consuming a signal file twice is
    /// impossible").
    pub fn drain_signals(&self, store: &StateStore) -> Vec<InboundCommand> {
        let mut commands = Vec::new();
        for path in store.list_signal_files() {
            if let Some(value) = store.read_signal(&path) {
                commands.push(parse_command(&value));
            }
            store.consume_signal(&path);
        }
        commands
    }
}

/// Decide whether a previously-pending spawn is still eligible: the issue
/// must still be open and not already claimed by some other shepherd.
pub fn spawn_still_eligible(pending: &PendingSpawn, ready_issue_numbers: &[u64]) -> bool {
    ready_issue_numbers.contains(&pending.issue)
}

pub fn signals_dir(paths: &LoomPaths) -> std::path::PathBuf {
    paths.signals_dir()
}

pub fn is_signal_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "json")
}

#[cfg(test)]
#[path = "discipline_tests.rs"]
mod tests;
