//! The immutable view the snapshot builder hands to the action executors
//! each tick, per spec §3/§4.E.

use serde::{Deserialize, Serialize};

use crate::issue::{Issue, Pr};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinningPr {
    pub pr_number: u64,
    pub review_cycles: u32,
    pub linked_issue: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub promotable_proposals: Vec<Issue>,
    pub ready_issues: Vec<Issue>,
    pub spinning_prs: Vec<SpinningPr>,
    pub open_prs: Vec<Pr>,
    pub default_branch_ci_failing: bool,
    pub taken_at_epoch_secs: i64,
}

impl Snapshot {
    pub fn recommended_actions(&self) -> Vec<&'static str> {
        let mut actions = Vec::new();
        if !self.promotable_proposals.is_empty() {
            actions.push("promote_proposals");
        }
        if !self.ready_issues.is_empty() {
            actions.push("spawn_shepherds");
        }
        if !self.spinning_prs.is_empty() {
            actions.push("escalate_spinning");
        }
        actions
    }
}
