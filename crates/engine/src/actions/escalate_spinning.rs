// SPDX-License-Identifier: MIT

//! Auto-escalate PRs stuck in a review-request loop, grounded 1:1 on
//! `daemon_v2/actions/spinning.py`.

use loom_adapters::platform::{Entity, PlatformClient};
use loom_core::labels;
use loom_core::snapshot::SpinningPr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationOutcome {
    pub pr_number: u64,
    pub linked_issue: Option<u64>,
}

/// For every spinning PR: comment, close, and — if it has a linked issue —
/// swap `loom:building` for `loom:blocked` on the issue and comment there
/// too. Each sub-step is best-effort; a failed comment or close doesn't
/// stop the remaining steps or the remaining PRs.
pub async fn escalate_spinning(platform: &dyn PlatformClient, spinning: &[SpinningPr]) -> Vec<EscalationOutcome> {
    let mut outcomes = Vec::new();

    for pr in spinning {
        let pr_body = format!(
            "**Spinning Issue Detected — Auto-Escalated**\n\nThis PR has gone through {} review cycles without landing and is being closed automatically.",
            pr.review_cycles,
        );
        platform.comment(Entity::Pr, pr.pr_number, &pr_body).await;
        platform.close(Entity::Pr, pr.pr_number).await;

        if let Some(issue) = pr.linked_issue {
            platform
                .edit_labels(
                    Entity::Issue,
                    issue,
                    &[labels::BLOCKED.to_string()],
                    &[labels::BUILDING.to_string()],
                )
                .await;
            let issue_body = format!(
                "**Spinning Issue — Auto-Blocked**\n\nPR #{} spun for {} review cycles and was closed automatically. This issue has been marked `{}` pending human review.",
                pr.pr_number, pr.review_cycles, labels::BLOCKED,
            );
            platform.comment(Entity::Issue, issue, &issue_body).await;
        }

        // Count against "issues escalated" (spec §8), not "PRs processed":
        // a spinning PR with no linked issue still gets closed above, but
        // nothing was escalated to block on, so it doesn't count.
        if let Some(issue) = pr.linked_issue {
            outcomes.push(EscalationOutcome { pr_number: pr.pr_number, linked_issue: Some(issue) });
        }
    }

    outcomes
}

#[cfg(test)]
#[path = "escalate_spinning_tests.rs"]
mod tests;
