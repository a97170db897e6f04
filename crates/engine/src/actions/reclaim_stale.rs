// SPDX-License-Identifier: MIT

//! Forcibly reclaim shepherd slots that stopped making progress, grounded
//! on spec §4.F "Reclaim-stale".

use loom_adapters::session::SessionAdapter;
use loom_core::daemon_state::{DaemonState, ShepherdStatus};
use loom_core::shepherd::Milestone;
use loom_storage::state_store::StateStore;

use crate::config::Config;
use crate::shepherd::PhaseName;

/// Whether any of the per-phase sessions the phase runner could currently
/// have open for `issue` is alive. The runner names sessions
/// `shepherd-{role}-{issue}` (one per phase, spec §4.G "Phase invocation"),
/// not after the daemon's shepherd slot, so a slot-derived name never
/// matches anything real — this checks every phase role instead.
async fn any_phase_session_alive(session: &dyn SessionAdapter, issue: u64) -> bool {
    for phase in PhaseName::ORDER {
        let name = format!("shepherd-{}-{issue}", phase.role());
        if session.exists(&name).await {
            return true;
        }
    }
    false
}

/// Last epoch-seconds timestamp at which a run showed any sign of life:
/// the most recent milestone of any kind, or `started_at` if none were
/// ever recorded. Mirrors the original's "no heartbeat/milestone since X"
/// staleness check.
fn last_activity(task_id: &str, store: &StateStore) -> Option<i64> {
    let progress = store.read_progress(task_id);
    progress
        .milestones
        .iter()
        .map(|m| match m {
            Milestone::Started { epoch_secs }
            | Milestone::PhaseEntered { epoch_secs, .. }
            | Milestone::Heartbeat { epoch_secs, .. }
            | Milestone::TransientError { epoch_secs, .. }
            | Milestone::PrCreated { epoch_secs, .. }
            | Milestone::PhaseContractSatisfied { epoch_secs, .. }
            | Milestone::Completed { epoch_secs, .. }
            | Milestone::Errored { epoch_secs, .. } => *epoch_secs,
        })
        .max()
}

/// A working shepherd slot is stale once its session has vanished, or once
/// it has gone `stale_grace_secs` since its progress file's last recorded
/// milestone. Either condition forces the slot back to idle with
/// `idle_reason = "stale"`.
pub async fn reclaim_stale(
    session: &dyn SessionAdapter,
    store: &StateStore,
    state: &mut DaemonState,
    config: &Config,
    now: i64,
) -> Vec<String> {
    let mut reclaimed = Vec::new();

    let slots: Vec<String> = state.shepherds.keys().cloned().collect();
    for slot in slots {
        let Some(entry) = state.shepherds.get(&slot) else { continue };
        if entry.status == ShepherdStatus::Idle {
            continue;
        }
        let Some(task_id) = entry.task_id.clone() else { continue };
        let Some(issue) = entry.issue else { continue };

        let session_gone = !any_phase_session_alive(session, issue).await;

        let grace_expired = last_activity(&task_id, store)
            .map(|since| now - since >= config.stale_grace_secs)
            .unwrap_or(false);

        if session_gone || grace_expired {
            if let Some(entry) = state.shepherds.get_mut(&slot) {
                entry.reset_to_idle(now, "stale");
            }
            reclaimed.push(slot);
        }
    }

    reclaimed
}

#[cfg(test)]
#[path = "reclaim_stale_tests.rs"]
mod tests;
