// SPDX-License-Identifier: MIT

//! Periodically launch out-of-band support-role sessions (guide, champion,
//! doctor, auditor, judge, curator), grounded 1:1 on spec §4.F
//! "Spawn-support-role" and `daemon_v2/actions/support_roles.py`.

use std::path::Path;

use loom_adapters::session::SessionAdapter;
use loom_core::daemon_state::{DaemonState, ShepherdStatus};

use crate::config::Config;

/// Session name a support role runs under, deterministic per role.
pub fn role_session_name(role: &str) -> String {
    format!("loom-role-{role}")
}

/// Whether `role`'s interval has elapsed since it was last spawned (never
/// spawned counts as elapsed), per spec §4.E's recommended-actions rule:
/// "include `trigger_<role>` iff its interval elapsed since
/// `support_roles[role].last_spawned`".
fn interval_elapsed(last_spawned: Option<i64>, interval_secs: i64, now: i64) -> bool {
    match last_spawned {
        Some(last) => now - last >= interval_secs,
        None => true,
    }
}

/// For every configured support role whose interval has elapsed, start a
/// session running its entrypoint if one isn't already alive, and record
/// `last_spawned`. Returns the roles actually (re)spawned this tick.
pub async fn spawn_support_role(
    session: &dyn SessionAdapter,
    state: &mut DaemonState,
    config: &Config,
    now: i64,
    repo_root: &Path,
) -> Vec<String> {
    let mut spawned = Vec::new();

    for (role, interval_secs) in &config.support_role_intervals {
        let last_spawned = state.support_roles.get(role).and_then(|e| e.last_spawned);
        if !interval_elapsed(last_spawned, *interval_secs, now) {
            continue;
        }

        let name = role_session_name(role);
        if session.exists(&name).await {
            continue;
        }

        if session.spawn(&name, repo_root, role, &[]).await.is_ok() {
            let entry = state.support_roles.entry(role.clone()).or_default();
            entry.status = ShepherdStatus::Building;
            entry.tmux_session = Some(name);
            entry.last_spawned = Some(now);
            spawned.push(role.clone());
        }
    }

    spawned
}

#[cfg(test)]
#[path = "spawn_support_role_tests.rs"]
mod tests;
