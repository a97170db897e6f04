// SPDX-License-Identifier: MIT

//! Reconcile finished shepherd runs back into daemon state, grounded 1:1 on
//! `daemon_v2/actions/completions.py::check_completions`/`handle_completion`.

use loom_adapters::cleanup::CompletionCleanup;
use loom_core::daemon_state::DaemonState;
use loom_core::shepherd::ProgressStatus;
use loom_storage::state_store::StateStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedShepherd {
    pub slot: String,
    pub issue: Option<u64>,
    pub pr_merged: bool,
}

/// Scan persisted progress files for runs that finished since the last
/// tick, reset their slot to idle, record the completion, and best-effort
/// notify the external cleanup collaborator. A progress file with no
/// matching `task_id` in `state.shepherds` (already reclaimed, or from a
/// stale daemon session) is deleted without further action.
pub async fn check_completions(
    store: &StateStore,
    cleanup: &dyn CompletionCleanup,
    state: &mut DaemonState,
) -> Vec<CompletedShepherd> {
    let mut completed = Vec::new();

    for progress in store.list_progress() {
        if !matches!(progress.status, ProgressStatus::Completed | ProgressStatus::Errored) {
            continue;
        }

        let slot = state
            .shepherds
            .iter()
            .find(|(_, entry)| entry.task_id.as_deref() == Some(progress.task_id.as_str()))
            .map(|(slot, _)| slot.clone());

        if let Some(slot) = slot {
            let now = progress
                .milestones
                .iter()
                .rev()
                .find_map(|m| match m {
                    loom_core::shepherd::Milestone::Completed { epoch_secs, .. }
                    | loom_core::shepherd::Milestone::Errored { epoch_secs, .. } => Some(*epoch_secs),
                    _ => None,
                })
                .unwrap_or(0);

            let issue = match state.shepherds.get_mut(&slot) {
                Some(entry) => {
                    let issue = entry.issue;
                    entry.reset_to_idle(now, "completed_issue");
                    issue
                }
                None => None,
            };

            if let Some(issue) = issue {
                if !state.completed_issues.contains(&issue) {
                    state.completed_issues.push(issue);
                }
                cleanup.shepherd_complete(issue).await;
            }
            if progress.pr_merged {
                state.total_prs_merged += 1;
            }

            completed.push(CompletedShepherd { slot, issue, pr_merged: progress.pr_merged });
        }

        store.delete_progress(&progress.task_id);
    }

    completed
}

#[cfg(test)]
#[path = "check_completions_tests.rs"]
mod tests;
