// SPDX-License-Identifier: MIT

//! The nine-step tick contract (spec §4.I), as a single pure-ish async
//! function over a bundle of collaborators. Split out of `main.rs` so it
//! can be driven directly against fake adapters, grounded on the teacher's
//! `oj-daemon`/`lifecycle.rs` split between "what a tick does" and "how the
//! process wraps a loop of ticks".

use std::path::Path;

use loom_adapters::cleanup::CompletionCleanup;
use loom_adapters::launcher::ShepherdLauncher;
use loom_adapters::platform::PlatformClient;
use loom_adapters::session::SessionAdapter;
use loom_core::id::IdGen;
use loom_engine::actions::{check_completions, claim_and_launch, escalate_spinning, promote_proposals, reclaim_stale, spawn_shepherds, spawn_support_role};
use loom_engine::discipline::{spawn_still_eligible, Discipline, InboundCommand};
use loom_engine::{build_snapshot, Config};
use loom_storage::StateStore;

use crate::context::RuntimeContext;

/// Why a tick (or the loop around it) stopped, mapped to `main.rs`'s exit
/// codes per spec §6's CLI surface table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    StopSignal,
    SessionSuperseded,
    WallClockTimeout,
}

/// Everything one tick needs, gathered so `run_tick` takes one argument
/// instead of eight. Borrowed, not owned: the daemon loop in `main.rs`
/// constructs these once at startup and reuses them every tick.
pub struct TickDeps<'a> {
    pub discipline: &'a Discipline,
    pub store: &'a StateStore,
    pub platform: &'a dyn PlatformClient,
    pub session: &'a dyn SessionAdapter,
    pub launcher: &'a dyn ShepherdLauncher,
    pub cleanup: &'a dyn CompletionCleanup,
    pub id_gen: &'a dyn IdGen,
    pub config: &'a Config,
    pub repo_root: &'a Path,
}

#[derive(Debug, Default)]
pub struct TickOutcome {
    pub shutdown: Option<ShutdownReason>,
    pub progressed: bool,
    pub ready_work: bool,
}

/// Run one tick of the nine-step contract. Returns `shutdown = Some(_)`
/// the moment steps 1-2 detect a reason to stop, without touching state
/// any further (the caller still persists nothing in that case, matching
/// the original's "yield before doing anything this tick" handoff).
pub async fn run_tick(deps: &TickDeps<'_>, ctx: &mut RuntimeContext, now: i64) -> TickOutcome {
    // 1. Stop signal.
    if deps.discipline.stop_signal_present() {
        return TickOutcome {
            shutdown: Some(ShutdownReason::StopSignal),
            ..Default::default()
        };
    }

    // 2. Session-id handoff.
    if deps.discipline.session_superseded(deps.store) {
        return TickOutcome {
            shutdown: Some(ShutdownReason::SessionSuperseded),
            ..Default::default()
        };
    }

    // 3. Read DaemonState.
    let mut state = deps.store.read_daemon_state();
    if state.daemon_session_id.is_empty() {
        state.daemon_session_id = deps.discipline.session_id().to_string();
    }

    // 4. Drain inbound signals.
    for command in deps.discipline.drain_signals(deps.store) {
        match command {
            InboundCommand::StartOrchestration => ctx.orchestration_active = true,
            InboundCommand::StopOrchestration => ctx.orchestration_active = false,
            InboundCommand::SpawnShepherd { issue, .. } => {
                state.pending_spawns.push(loom_core::daemon_state::PendingSpawn { issue, requested_at: now });
            }
            InboundCommand::Unknown(_) => {}
        }
    }

    // 5. Build snapshot.
    let snapshot = build_snapshot(deps.platform, now).await;

    // 6. Snapshot + state are both already in scope as our in-memory
    // context for the rest of this tick; nothing further to attach.

    // 7. Ordered actions.
    let reclaimed = reclaim_stale(deps.session, deps.store, &mut state, deps.config, now).await;
    // `check_completions` already folds each completion's issue/merge
    // counter into `state` directly; `completed` here is only used below
    // to report whether this tick made progress.
    let completed = check_completions(deps.store, deps.cleanup, &mut state).await;
    let escalated = escalate_spinning(deps.platform, &snapshot.spinning_prs).await;

    let promoted = if deps.config.force_mode {
        promote_proposals(deps.platform, &snapshot).await
    } else {
        Vec::new()
    };

    let support_spawned = spawn_support_role(deps.session, &mut state, deps.config, now, deps.repo_root).await;

    let shepherds_spawned = if ctx.orchestration_active && deps.config.auto_build {
        spawn_shepherds(deps.platform, deps.launcher, deps.id_gen, &snapshot, &mut state, deps.config, deps.repo_root).await
    } else {
        Vec::new()
    };

    let ready_numbers: Vec<u64> = snapshot.ready_issues.iter().map(|i| i.number).collect();
    let slots = (1..=deps.config.max_shepherds).map(|n| format!("shepherd-{n}")).collect::<Vec<_>>();
    let mut still_pending = Vec::new();
    let mut pending_serviced = false;
    for pending in std::mem::take(&mut state.pending_spawns) {
        if !spawn_still_eligible(&pending, &ready_numbers) {
            continue;
        }
        let mut available = state.available_shepherd_slots(&slots);
        if available.is_empty() {
            still_pending.push(pending);
            continue;
        }
        let slot = available.remove(0);
        match claim_and_launch(deps.platform, deps.launcher, deps.id_gen, pending.issue, slot, &mut state, deps.repo_root).await {
            Ok(_) => pending_serviced = true,
            Err(_) => still_pending.push(pending),
        }
    }
    state.pending_spawns = still_pending;

    // 8. Persist updated DaemonState.
    let _ = deps.store.write_daemon_state(&state);

    let ready_work = !snapshot.ready_issues.is_empty() || !snapshot.promotable_proposals.is_empty() || !snapshot.spinning_prs.is_empty();
    let progressed = !reclaimed.is_empty()
        || !completed.is_empty()
        || !escalated.is_empty()
        || !promoted.is_empty()
        || !support_spawned.is_empty()
        || !shepherds_spawned.is_empty()
        || pending_serviced;

    ctx.note_progress(ready_work, progressed);

    TickOutcome {
        shutdown: None,
        progressed,
        ready_work,
    }
}

#[cfg(test)]
#[path = "tick_tests.rs"]
mod tests;
