// SPDX-License-Identifier: MIT

//! Derives the dashboard-facing health files (`HealthMetrics`,
//! `AlertsFile`) each tick from the runtime counters and
//! [`loom_core::StuckHistory`], per spec §3's "auxiliary files consumed by
//! dashboards" and §4.E's `pipeline_health.{retryable_issues,
//! escalation_needed}` / `computed.health_status` fields — supplemented
//! here since spec.md fixes the shape of the *files* but not the exact
//! derivation, which `original_source/` does not expose either; this is
//! the implementer's documented tightening (see DESIGN.md).

use loom_core::health::{Alert, AlertsFile, HealthMetrics, StuckHistory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// A `StuckHistory` entry that has failed at least twice is the "budget
/// exhausted, hand to architect" trigger named in the exit-code-8 note in
/// spec §4.G; counting those entries gives `escalation_needed`.
fn escalation_needed(history: &StuckHistory) -> bool {
    history.issues.values().any(|entry| entry.occurrences >= 2)
}

/// Issues whose last recorded failure was a transient platform error (exit
/// code 7) and that haven't yet exhausted their retry budget are
/// `retryable_issues`.
fn retryable_issues(history: &StuckHistory) -> usize {
    history
        .issues
        .values()
        .filter(|entry| entry.last_exit_code == Some(7) && entry.occurrences < 3)
        .count()
}

/// Unhealthy once stalled five ticks in a row or three-plus issues have
/// tripped the stuck-history budget; degraded on any lesser sign of
/// trouble (a stall, a failing default-branch CI, or any blocked issue);
/// healthy otherwise.
pub fn derive_status(consecutive_stalled: u32, default_branch_ci_failing: bool, history: &StuckHistory) -> HealthStatus {
    let blocked = history.issues.len();
    if consecutive_stalled >= 5 || blocked >= 3 {
        HealthStatus::Unhealthy
    } else if consecutive_stalled > 0 || default_branch_ci_failing || blocked > 0 {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Update the in-memory `HealthMetrics` snapshot for this tick.
pub fn update_metrics(metrics: &mut HealthMetrics, consecutive_stalled: u32, active_shepherds: u32, completed_total: u64, now: i64) {
    metrics.iterations += 1;
    metrics.consecutive_stalled = consecutive_stalled;
    metrics.last_tick_epoch_secs = now;
    metrics.active_shepherds = active_shepherds;
    metrics.completed_total = completed_total;
}

/// Append an alert when health degrades to unhealthy, bounding the ring to
/// its last 50 entries the way `DaemonState.warnings` is described as a
/// "bounded ring of recent warnings" in spec §3.
pub fn record_alert_if_unhealthy(alerts: &mut AlertsFile, status: HealthStatus, now: i64) {
    if status != HealthStatus::Unhealthy {
        return;
    }
    alerts.alerts.push(Alert {
        kind: "unhealthy".to_string(),
        message: "pipeline health degraded to unhealthy".to_string(),
        raised_at_epoch_secs: now,
    });
    const MAX_ALERTS: usize = 50;
    if alerts.alerts.len() > MAX_ALERTS {
        let excess = alerts.alerts.len() - MAX_ALERTS;
        alerts.alerts.drain(0..excess);
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
