use super::*;

#[test]
fn processing_indicator_is_detected() {
    assert!(is_actively_processing("some output\nesc to interrupt\n"));
    assert!(!is_actively_processing("idle shell prompt\n$"));
}

#[test]
fn idle_action_escalates_at_thresholds() {
    assert_eq!(idle_action(10, 300, 900, CriticalAction::Restart), IdleAction::None);
    assert_eq!(idle_action(300, 300, 900, CriticalAction::Restart), IdleAction::Warn);
    assert_eq!(idle_action(899, 300, 900, CriticalAction::Restart), IdleAction::Warn);
    assert_eq!(
        idle_action(900, 300, 900, CriticalAction::Restart),
        IdleAction::Critical(CriticalAction::Restart)
    );
}

#[test]
fn pending_prompt_indicator_is_detected() {
    assert!(pending_prompt_visible("1. Yes\n2. No\nDo you want to proceed?"));
    assert!(!pending_prompt_visible("esc to interrupt"));
}

#[test]
fn prompt_stuck_detector_honors_age_threshold() {
    assert!(!prompt_is_stuck(10, 120));
    assert!(prompt_is_stuck(120, 120));
    assert!(prompt_is_stuck(200, 120));
}

#[test]
fn prompt_recovery_is_rate_limited_by_cooldown() {
    assert!(prompt_recovery_allowed(None, 300));
    assert!(!prompt_recovery_allowed(Some(100), 300));
    assert!(prompt_recovery_allowed(Some(300), 300));
}
