//! Shepherd progress tracking and exit codes, grounded on spec §4.G and on
//! `loom_tools/shepherd/exit_codes.py`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::health::{CompletionEntry, CompletionKind};

/// The granular exit codes a shepherd phase runner terminates with.
/// Values and meanings are a direct port of `ShepherdExitCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ShepherdExitCode {
    /// Success: merged or approved.
    Success = 0,
    /// Builder produced no PR.
    NoPr = 1,
    /// A PR was created but tests still failed after doctor retries.
    TestsFailed = 2,
    /// Shutdown signal observed mid-run.
    Shutdown = 3,
    /// Stuck or blocked, needs human intervention.
    Stuck = 4,
    /// Already complete, nothing to do.
    Skipped = 5,
    /// No changes were needed.
    NoChangesNeeded = 6,
    /// Transient platform error.
    TransientError = 7,
    /// Retry budget for this issue is exhausted.
    BudgetExhausted = 8,
}

impl ShepherdExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Success => "success (merged or approved)",
            Self::NoPr => "builder produced no PR",
            Self::TestsFailed => "PR created but tests failed after doctor retries",
            Self::Shutdown => "shutdown signal observed",
            Self::Stuck => "stuck/blocked, needs intervention",
            Self::Skipped => "skipped (already complete)",
            Self::NoChangesNeeded => "no changes needed",
            Self::TransientError => "transient platform error",
            Self::BudgetExhausted => "budget exhausted",
        }
    }

    /// Terminal codes that trigger the `loom:building -> loom:blocked`
    /// transition, per spec §4.G "Blocking transition".
    pub fn blocks_issue(self) -> bool {
        matches!(self, Self::Stuck | Self::NoChangesNeeded | Self::BudgetExhausted)
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::NoPr),
            2 => Some(Self::TestsFailed),
            3 => Some(Self::Shutdown),
            4 => Some(Self::Stuck),
            5 => Some(Self::Skipped),
            6 => Some(Self::NoChangesNeeded),
            7 => Some(Self::TransientError),
            8 => Some(Self::BudgetExhausted),
            _ => None,
        }
    }
}

/// Milestones a shepherd phase runner reports as it progresses, the Rust
/// counterpart of the teacher's tagged `Event` enum
/// (`oj-core::event::Event`), scoped down to the handful of kinds a
/// supervised shepherd run actually emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Milestone {
    #[serde(rename = "shepherd:started")]
    Started { epoch_secs: i64 },
    #[serde(rename = "shepherd:phase_entered")]
    PhaseEntered { phase: String, epoch_secs: i64 },
    #[serde(rename = "shepherd:heartbeat")]
    Heartbeat { phase: String, epoch_secs: i64 },
    #[serde(rename = "shepherd:transient_error")]
    TransientError {
        phase: String,
        error: String,
        pattern: String,
        epoch_secs: i64,
    },
    #[serde(rename = "shepherd:pr_created")]
    PrCreated { pr_number: u64, epoch_secs: i64 },
    #[serde(rename = "shepherd:phase_contract_satisfied")]
    PhaseContractSatisfied { phase: String, epoch_secs: i64 },
    #[serde(rename = "shepherd:completed")]
    Completed {
        exit_code: i32,
        epoch_secs: i64,
    },
    #[serde(rename = "shepherd:errored")]
    Errored {
        exit_code: i32,
        message: String,
        epoch_secs: i64,
    },
}

impl Milestone {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Errored { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "shepherd:started",
            Self::PhaseEntered { .. } => "shepherd:phase_entered",
            Self::Heartbeat { .. } => "shepherd:heartbeat",
            Self::TransientError { .. } => "shepherd:transient_error",
            Self::PrCreated { .. } => "shepherd:pr_created",
            Self::PhaseContractSatisfied { .. } => "shepherd:phase_contract_satisfied",
            Self::Completed { .. } => "shepherd:completed",
            Self::Errored { .. } => "shepherd:errored",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("milestone {0} recorded before shepherd:started")]
    NotStarted(&'static str),
    #[error("milestone recorded after a terminal milestone was already present")]
    AlreadyTerminal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShepherdProgress {
    pub task_id: String,
    #[serde(default)]
    pub issue: Option<u64>,
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    /// The PR this run ended up attached to, if any, surfaced to
    /// `check_completions` without it having to replay the milestone log.
    #[serde(default)]
    pub pr_number: Option<u64>,
    /// Whether the merge phase itself merged the PR (force mode), as
    /// opposed to leaving it for an external champion — drives
    /// `DaemonState.total_prs_merged`, per spec §8 scenario 5.
    #[serde(default)]
    pub pr_merged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Running,
    Completed,
    Errored,
}

impl Default for ProgressStatus {
    fn default() -> Self {
        Self::Running
    }
}

impl ShepherdProgress {
    pub fn new(task_id: impl Into<String>, issue: Option<u64>) -> Self {
        Self {
            task_id: task_id.into(),
            issue,
            status: ProgressStatus::Running,
            milestones: Vec::new(),
            exit_code: None,
            pr_number: None,
            pr_merged: false,
        }
    }

    /// Record a milestone, enforcing: `shepherd:started` must come first,
    /// and nothing may follow a terminal milestone.
    pub fn record_milestone(&mut self, milestone: Milestone) -> Result<(), ProgressError> {
        let has_started = self
            .milestones
            .iter()
            .any(|m| matches!(m, Milestone::Started { .. }));
        if !has_started && !matches!(milestone, Milestone::Started { .. }) {
            return Err(ProgressError::NotStarted(milestone.name()));
        }
        if self.milestones.iter().any(Milestone::is_terminal) {
            return Err(ProgressError::AlreadyTerminal);
        }
        if let Milestone::Completed { exit_code, .. } | Milestone::Errored { exit_code, .. } =
            &milestone
        {
            self.exit_code = Some(*exit_code);
            self.status = if matches!(milestone, Milestone::Completed { .. }) {
                ProgressStatus::Completed
            } else {
                ProgressStatus::Errored
            };
        }
        self.milestones.push(milestone);
        Ok(())
    }
}

#[cfg(test)]
#[path = "shepherd_tests.rs"]
mod tests;
