//! Health/alerting/stuck-history models, grounded on spec §3 and
//! supplemented from `models/baseline_health.py` field shapes recovered
//! from `original_source/`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineStatus {
    Healthy,
    Failing,
    Unknown,
}

impl Default for BaselineStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for BaselineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Healthy => "healthy",
            Self::Failing => "failing",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for BaselineStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "healthy" => Ok(Self::Healthy),
            "failing" => Ok(Self::Failing),
            "unknown" => Ok(Self::Unknown),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineHealth {
    #[serde(default)]
    pub status: BaselineStatus,
    #[serde(default)]
    pub tests: Vec<String>,
    #[serde(default)]
    pub issue_tag: Option<String>,
    #[serde(default)]
    pub reported_at_epoch_ms: i64,
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl BaselineHealth {
    /// Whether this reading is still within its freshness window.
    pub fn is_fresh(&self, now_epoch_ms: i64) -> bool {
        match self.ttl_secs {
            Some(ttl) => now_epoch_ms - self.reported_at_epoch_ms <= (ttl as i64) * 1000,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthMetrics {
    #[serde(default)]
    pub iterations: u64,
    #[serde(default)]
    pub consecutive_stalled: u32,
    #[serde(default)]
    pub last_tick_epoch_secs: i64,
    #[serde(default)]
    pub active_shepherds: u32,
    #[serde(default)]
    pub completed_total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: String,
    pub message: String,
    pub raised_at_epoch_secs: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertsFile {
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckEntry {
    #[serde(default)]
    pub occurrences: u32,
    #[serde(default)]
    pub last_exit_code: Option<i32>,
    #[serde(default)]
    pub last_seen_epoch_secs: i64,
    #[serde(default)]
    pub blocked_reason: Option<String>,
}

/// Per-issue history of phase failures, keyed by issue number as a string
/// (JSON object keys are always strings). Used to decide when an issue's
/// budget is exhausted and it should be handed to the architect role for
/// decomposition, per the shepherd exit-code table's `BudgetExhausted`
/// entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StuckHistory {
    #[serde(default)]
    pub issues: HashMap<String, StuckEntry>,
}

impl StuckHistory {
    pub fn record_failure(&mut self, issue: u64, exit_code: i32, now: i64) -> u32 {
        let entry = self.issues.entry(issue.to_string()).or_default();
        entry.occurrences += 1;
        entry.last_exit_code = Some(exit_code);
        entry.last_seen_epoch_secs = now;
        entry.occurrences
    }

    pub fn clear(&mut self, issue: u64) {
        self.issues.remove(&issue.to_string());
    }
}

/// An item scanned off shepherd/support-role progress during
/// `check_completions`, never persisted on its own. Grounded 1:1 on
/// `daemon_v2/actions/completions.py::CompletionEntry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionKind {
    Shepherd,
    SupportRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEntry {
    pub kind: CompletionKind,
    pub name: String,
    pub issue: Option<u64>,
    pub task_id: String,
    pub success: bool,
    pub pr_merged: bool,
}
