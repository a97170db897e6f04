// SPDX-License-Identifier: MIT

//! Claim ready issues and launch shepherd children onto idle slots,
//! grounded 1:1 on spec §4.F "Spawn-shepherds" and
//! `daemon_v2/actions/spawn.py::spawn_shepherds`.

use loom_adapters::launcher::ShepherdLauncher;
use loom_adapters::platform::{Entity, PlatformClient};
use loom_core::daemon_state::{DaemonState, ShepherdEntry, ShepherdStatus};
use loom_core::id::IdGen;
use loom_core::issue::Issue;
use loom_core::labels;
use loom_core::snapshot::Snapshot;
use std::path::Path;

use crate::config::{Config, IssueStrategy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned { slot: String, issue: u64, task_id: String },
    ClaimFailed { issue: u64 },
    LaunchFailed { issue: u64 },
}

fn slot_names(max_shepherds: u32) -> Vec<String> {
    (1..=max_shepherds).map(|n| format!("shepherd-{n}")).collect()
}

fn order_candidates(issues: &[Issue], strategy: IssueStrategy) -> Vec<u64> {
    let mut numbers: Vec<u64> = issues.iter().map(|i| i.number).collect();
    numbers.sort_unstable();
    if strategy == IssueStrategy::Lifo {
        numbers.reverse();
    }
    numbers
}

/// For each idle shepherd slot, while ready issues remain, atomically claim
/// the next candidate (`loom:issue -> loom:building`) and launch a detached
/// shepherd child. Gated entirely on `config.auto_build` by the caller (the
/// daemon loop, per spec §4.I step 7) — this function itself has no
/// gating, matching `spawn_shepherds`'s own unconditional body in the
/// original (the gate lives one layer up).
pub async fn spawn_shepherds(
    platform: &dyn PlatformClient,
    launcher: &dyn ShepherdLauncher,
    id_gen: &dyn IdGen,
    snapshot: &Snapshot,
    state: &mut DaemonState,
    config: &Config,
    repo_root: &Path,
) -> Vec<SpawnOutcome> {
    let slots = slot_names(config.max_shepherds);
    let mut available = state.available_shepherd_slots(&slots);
    let mut candidates = order_candidates(&snapshot.ready_issues, config.issue_strategy);

    let mut outcomes = Vec::new();

    while !available.is_empty() && !candidates.is_empty() {
        let slot = available.remove(0);
        let issue_number = candidates.remove(0);

        match claim_and_launch(platform, launcher, id_gen, issue_number, slot.clone(), state, repo_root).await {
            Ok(outcome) => outcomes.push(outcome),
            Err(outcome @ SpawnOutcome::ClaimFailed { .. }) => {
                // The candidate lost a label-edit race; drop it and retry the
                // same slot against the next one, instead of burning the slot.
                available.insert(0, slot);
                outcomes.push(outcome);
            }
            Err(outcome) => outcomes.push(outcome),
        }
    }

    outcomes
}

/// Claim one specific issue onto one specific slot: atomic label swap,
/// fresh task id, detached launch, and the claim-revert-on-launch-failure
/// dance of spec §4.F step 4. Shared by the FIFO/LIFO sweep above and by
/// the daemon's `pending_spawns` drain, which targets a slot/issue pair
/// chosen by inbound command rather than by strategy order.
pub async fn claim_and_launch(
    platform: &dyn PlatformClient,
    launcher: &dyn ShepherdLauncher,
    id_gen: &dyn IdGen,
    issue_number: u64,
    slot: String,
    state: &mut DaemonState,
    repo_root: &Path,
) -> Result<SpawnOutcome, SpawnOutcome> {
    let claimed = platform
        .edit_labels(
            Entity::Issue,
            issue_number,
            &[labels::BUILDING.to_string()],
            &[labels::ISSUE.to_string()],
        )
        .await;
    if !claimed {
        return Err(SpawnOutcome::ClaimFailed { issue: issue_number });
    }

    let task_id = id_gen.next("task");
    match launcher.spawn_shepherd(issue_number, &task_id, &[], repo_root).await {
        Ok(()) => {
            state.shepherds.insert(
                slot.clone(),
                ShepherdEntry {
                    status: ShepherdStatus::Building,
                    task_id: Some(task_id.clone()),
                    issue: Some(issue_number),
                    ..Default::default()
                },
            );
            Ok(SpawnOutcome::Spawned { slot, issue: issue_number, task_id })
        }
        Err(_) => {
            // Revert the claim so the issue is picked up again next tick.
            platform
                .edit_labels(
                    Entity::Issue,
                    issue_number,
                    &[labels::ISSUE.to_string()],
                    &[labels::BUILDING.to_string()],
                )
                .await;
            Err(SpawnOutcome::LaunchFailed { issue: issue_number })
        }
    }
}

#[cfg(test)]
#[path = "spawn_shepherds_tests.rs"]
mod tests;
