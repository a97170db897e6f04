// SPDX-License-Identifier: MIT

//! Action executors (component F): one file per concern, each a plain
//! async function over a [`loom_core::snapshot::Snapshot`] and the state
//! store/platform/session adapters, grounded 1:1 on
//! `loom_tools/daemon_v2/actions/*.py`'s one-module-per-action layout.

mod check_completions;
mod escalate_spinning;
mod promote_proposals;
mod reclaim_stale;
mod spawn_shepherds;
mod spawn_support_role;

pub use check_completions::{check_completions, CompletedShepherd};
pub use escalate_spinning::{escalate_spinning, EscalationOutcome};
pub use promote_proposals::promote_proposals;
pub use reclaim_stale::reclaim_stale;
pub use spawn_shepherds::{claim_and_launch, spawn_shepherds, SpawnOutcome};
pub use spawn_support_role::spawn_support_role;
