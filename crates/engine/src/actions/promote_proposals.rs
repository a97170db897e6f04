// SPDX-License-Identifier: MIT

//! Promote every curated proposal to `loom:issue` in force mode, grounded
//! on `loom_tools/daemon_v2/actions/proposals.py::promote_proposals`.

use loom_adapters::platform::{Entity, PlatformClient};
use loom_core::labels;
use loom_core::snapshot::Snapshot;

/// Promote every promotable proposal to `loom:issue`, oldest issue number
/// first. Returns the issue numbers actually promoted (an `edit_labels`
/// failure for one issue doesn't stop the rest). `issue_threshold` gates
/// new *work* (spawning shepherds), not promotion — the original promotes
/// unconditionally in force mode, with no cap.
pub async fn promote_proposals(platform: &dyn PlatformClient, snapshot: &Snapshot) -> Vec<u64> {
    let mut candidates: Vec<_> = snapshot.promotable_proposals.iter().collect();
    candidates.sort_by_key(|issue| issue.number);

    let mut promoted = Vec::new();
    for issue in candidates {
        let remove: Vec<String> = labels::PROMOTABLE
            .iter()
            .filter(|label| issue.has_label(label))
            .map(|label| label.to_string())
            .collect();
        if platform
            .edit_labels(Entity::Issue, issue.number, &[labels::ISSUE.to_string()], &remove)
            .await
        {
            let body = format!(
                "## Auto-Promoted [force-mode]\n\nRemoved: {}\nAdded: {}",
                remove.join(", "),
                labels::ISSUE,
            );
            platform.comment(Entity::Issue, issue.number, &body).await;
            promoted.push(issue.number);
        }
    }
    promoted
}

#[cfg(test)]
#[path = "promote_proposals_tests.rs"]
mod tests;
