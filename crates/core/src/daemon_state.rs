//! The daemon's persisted state file, grounded on spec §3 and on
//! `daemon_v2/actions/completions.py`'s reset-to-idle field set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShepherdStatus {
    Idle,
    Building,
}

impl Default for ShepherdStatus {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShepherdEntry {
    #[serde(default)]
    pub status: ShepherdStatus,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub issue: Option<u64>,
    #[serde(default)]
    pub pr_number: Option<u64>,
    #[serde(default)]
    pub output_file: Option<String>,
    #[serde(default)]
    pub idle_since: Option<i64>,
    #[serde(default)]
    pub idle_reason: Option<String>,
    #[serde(default)]
    pub last_issue: Option<u64>,
    #[serde(default)]
    pub last_completed: Option<i64>,
}

impl ShepherdEntry {
    /// Reset an entry to idle after a completion or a forced reclaim, per
    /// `_handle_shepherd_completion`. `reason` is `"completed_issue"` or
    /// `"stale"`.
    pub fn reset_to_idle(&mut self, now: i64, reason: &str) {
        let issue = self.issue.take();
        self.status = ShepherdStatus::Idle;
        self.idle_since = Some(now);
        self.idle_reason = Some(reason.to_string());
        self.last_issue = issue;
        self.task_id = None;
        self.output_file = None;
        self.pr_number = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRoleEntry {
    #[serde(default)]
    pub status: ShepherdStatus,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub tmux_session: Option<String>,
    #[serde(default)]
    pub last_spawned: Option<i64>,
    #[serde(default)]
    pub last_completed: Option<i64>,
}

impl SupportRoleEntry {
    pub fn reset_to_idle(&mut self, now: i64) {
        self.status = ShepherdStatus::Idle;
        self.task_id = None;
        self.tmux_session = None;
        self.last_completed = Some(now);
    }
}

/// A `spawn_shepherd`/`spawn_support_role` request that couldn't be
/// serviced on the tick it arrived (no free slot), kept in memory and
/// retried each tick until serviced or no longer eligible. Grounded on
/// `daemon_v2/context.py::DaemonContext.pending_spawns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSpawn {
    pub issue: u64,
    pub requested_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonState {
    /// `"{epoch_secs}-{pid}"`, used for session-conflict detection between
    /// two daemon processes fighting over one state file.
    pub daemon_session_id: String,
    #[serde(default)]
    pub shepherds: HashMap<String, ShepherdEntry>,
    #[serde(default)]
    pub support_roles: HashMap<String, SupportRoleEntry>,
    #[serde(default)]
    pub completed_issues: Vec<u64>,
    #[serde(default)]
    pub total_prs_merged: u64,
    #[serde(default)]
    pub pending_spawns: Vec<PendingSpawn>,
}

impl DaemonState {
    pub fn new_session(session_id: impl Into<String>) -> Self {
        Self {
            daemon_session_id: session_id.into(),
            ..Default::default()
        }
    }

    pub fn available_shepherd_slots(&self, slot_names: &[String]) -> Vec<String> {
        slot_names
            .iter()
            .filter(|name| {
                self.shepherds
                    .get(name.as_str())
                    .map(|e| e.status == ShepherdStatus::Idle)
                    .unwrap_or(true)
            })
            .cloned()
            .collect()
    }
}
