// SPDX-License-Identifier: MIT

//! The phase table: `[curator, approval, builder, judge, doctor, merge]`,
//! their skip rules, and the `--from <phase>` lookup — grounded on
//! spec §4.G and on the "dynamic dispatch over phases -> tagged variant +
//! table" REDESIGN FLAG (spec §9): each phase is a record in an ordered
//! list rather than a virtual dispatch hierarchy.

use loom_core::issue::Issue;
use loom_core::labels;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseName {
    Curator,
    Approval,
    Builder,
    Judge,
    Doctor,
    Merge,
}

impl PhaseName {
    pub const ORDER: [PhaseName; 6] = [
        PhaseName::Curator,
        PhaseName::Approval,
        PhaseName::Builder,
        PhaseName::Judge,
        PhaseName::Doctor,
        PhaseName::Merge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Curator => "curator",
            Self::Approval => "approval",
            Self::Builder => "builder",
            Self::Judge => "judge",
            Self::Doctor => "doctor",
            Self::Merge => "merge",
        }
    }

    pub fn from_str(raw: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|p| p.as_str() == raw)
    }

    pub fn index(self) -> usize {
        Self::ORDER.iter().position(|p| *p == self).expect("phase is in ORDER")
    }

    /// The role name a spawned session runs under, used to build a
    /// deterministic session name (spec §4.G "Phase invocation").
    pub fn role(self) -> &'static str {
        self.as_str()
    }
}

/// Whether `--from start_phase` means `phase` should be skipped, per
/// spec §4.G: "`--from <phase>` skips all earlier phases in its strict
/// order".
pub fn skipped_by_from(start_phase: Option<PhaseName>, phase: PhaseName) -> bool {
    match start_phase {
        Some(start) => phase.index() < start.index(),
        None => false,
    }
}

/// Validates the post-skip invariant for `--from judge`: the PR must
/// already bear `loom:pr`, per spec §4.G. Returns `false` if the
/// invariant is violated and the attempt should fail outright.
pub fn from_judge_precondition_holds(start_phase: Option<PhaseName>, pr: Option<&loom_core::issue::Pr>) -> bool {
    if start_phase != Some(PhaseName::Judge) {
        return true;
    }
    pr.is_some_and(|pr| pr.has_label(labels::PR))
}

/// Curator is additionally skipped if the issue already has `loom:curated`,
/// per spec §4.G.
pub fn curator_already_skippable(issue: &Issue) -> bool {
    issue.has_label(labels::CURATED)
}

/// Approval outcome: whether the phase should be skipped outright (issue
/// already `loom:issue`/`loom:building`), auto-approved by applying
/// `loom:issue` (default/force mode with neither label present), or run
/// for real (neither condition — e.g. gating disabled), per spec §4.G.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDisposition {
    Skip,
    AutoApprove,
    Run,
}

pub fn approval_disposition(issue: &Issue, auto_approve_enabled: bool) -> ApprovalDisposition {
    if issue.has_label(labels::ISSUE) || issue.has_label(labels::BUILDING) {
        return ApprovalDisposition::Skip;
    }
    if auto_approve_enabled {
        return ApprovalDisposition::AutoApprove;
    }
    ApprovalDisposition::Run
}

#[cfg(test)]
#[path = "phases_tests.rs"]
mod tests;
