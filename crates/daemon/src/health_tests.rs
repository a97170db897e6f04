use super::*;
use loom_core::health::StuckEntry;

fn history_with(occurrences: u32) -> StuckHistory {
    let mut history = StuckHistory::default();
    history.issues.insert(
        "1".to_string(),
        StuckEntry {
            occurrences,
            last_exit_code: Some(4),
            last_seen_epoch_secs: 100,
            blocked_reason: None,
        },
    );
    history
}

#[test]
fn healthy_with_no_signs_of_trouble() {
    let history = StuckHistory::default();
    assert_eq!(derive_status(0, false, &history), HealthStatus::Healthy);
}

#[test]
fn degraded_on_a_single_stall_or_failing_ci() {
    let history = StuckHistory::default();
    assert_eq!(derive_status(1, false, &history), HealthStatus::Degraded);
    assert_eq!(derive_status(0, true, &history), HealthStatus::Degraded);
}

#[test]
fn unhealthy_once_stalled_five_ticks_or_three_blocked_issues() {
    let history = history_with(1);
    assert_eq!(derive_status(5, false, &StuckHistory::default()), HealthStatus::Unhealthy);

    let mut many = StuckHistory::default();
    for n in 0..3 {
        many.issues.insert(
            n.to_string(),
            StuckEntry {
                occurrences: 1,
                last_exit_code: Some(4),
                last_seen_epoch_secs: 1,
                blocked_reason: None,
            },
        );
    }
    assert_eq!(derive_status(0, false, &many), HealthStatus::Unhealthy);
    let _ = history;
}

#[test]
fn alert_recorded_only_when_unhealthy() {
    let mut alerts = AlertsFile::default();
    record_alert_if_unhealthy(&mut alerts, HealthStatus::Degraded, 100);
    assert!(alerts.alerts.is_empty());

    record_alert_if_unhealthy(&mut alerts, HealthStatus::Unhealthy, 200);
    assert_eq!(alerts.alerts.len(), 1);
    assert_eq!(alerts.alerts[0].raised_at_epoch_secs, 200);
}

#[test]
fn alert_ring_is_bounded() {
    let mut alerts = AlertsFile::default();
    for n in 0..60 {
        record_alert_if_unhealthy(&mut alerts, HealthStatus::Unhealthy, n);
    }
    assert_eq!(alerts.alerts.len(), 50);
    assert_eq!(alerts.alerts.last().unwrap().raised_at_epoch_secs, 59);
}

#[test]
fn metrics_updated_each_call() {
    let mut metrics = HealthMetrics::default();
    update_metrics(&mut metrics, 2, 3, 7, 1_000);
    assert_eq!(metrics.iterations, 1);
    assert_eq!(metrics.consecutive_stalled, 2);
    assert_eq!(metrics.active_shepherds, 3);
    assert_eq!(metrics.completed_total, 7);
    assert_eq!(metrics.last_tick_epoch_secs, 1_000);

    update_metrics(&mut metrics, 0, 1, 8, 2_000);
    assert_eq!(metrics.iterations, 2);
}

#[test]
fn escalation_needed_and_retryable_helpers_read_history() {
    let history = history_with(2);
    assert!(escalation_needed(&history));
    assert_eq!(retryable_issues(&history), 0);

    let mut transient = StuckHistory::default();
    transient.issues.insert(
        "9".to_string(),
        StuckEntry {
            occurrences: 1,
            last_exit_code: Some(7),
            last_seen_epoch_secs: 1,
            blocked_reason: None,
        },
    );
    assert!(!escalation_needed(&transient));
    assert_eq!(retryable_issues(&transient), 1);
}
