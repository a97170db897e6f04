// SPDX-License-Identifier: MIT

//! Idle-time and prompt-stuck detection for a running phase session,
//! grounded 1:1 on `loom_tools/common/tmux_session.py`'s
//! `PROCESSING_INDICATORS` check and on spec §4.G's monitoring contract.
//! Pure functions over captured pane text and elapsed seconds so the
//! escalation ladder (warn -> pause -> restart -> retry) is unit-testable
//! without real sleeps or tmux.

use loom_adapters::session::{PENDING_PROMPT_INDICATOR, PROCESSING_INDICATOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleAction {
    /// Still within tolerance, nothing to do.
    None,
    /// Idle past `warning_threshold`: log and keep waiting.
    Warn,
    /// Idle past `critical_threshold`: apply the configured critical
    /// action.
    Critical(CriticalAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriticalAction {
    Warn,
    Pause,
    Restart,
    Retry,
}

/// Is the pane showing Claude Code's "actively processing a turn"
/// indicator? If so the agent counts as live, not idle, regardless of how
/// long the phase has been running.
pub fn is_actively_processing(pane_text: &str) -> bool {
    pane_text.contains(PROCESSING_INDICATOR)
}

/// Is a permission prompt currently visible in the pane, blocking the
/// agent until answered? Distinct from idle-time detection: a pane can
/// show this the instant a phase starts, well before any idle threshold.
pub fn pending_prompt_visible(pane_text: &str) -> bool {
    pane_text.contains(PENDING_PROMPT_INDICATOR)
}

/// Decide what to do given how long the agent has been idle (not actively
/// processing) and the configured thresholds, per spec §4.G: "An agent idle
/// >= warning_threshold produces a warning; >= critical_threshold triggers
/// the configured action".
pub fn idle_action(
    idle_secs: i64,
    warning_threshold_secs: i64,
    critical_threshold_secs: i64,
    critical_action: CriticalAction,
) -> IdleAction {
    if idle_secs >= critical_threshold_secs {
        IdleAction::Critical(critical_action)
    } else if idle_secs >= warning_threshold_secs {
        IdleAction::Warn
    } else {
        IdleAction::None
    }
}

/// A pending-prompt indicator is visible and has been continuously visible
/// for at least `prompt_stuck_age_threshold_secs` since it was *first*
/// detected — `first_seen_secs_ago` is the age of that first sighting, per
/// spec §4.G's "distinct prompt-stuck detector".
pub fn prompt_is_stuck(first_seen_secs_ago: i64, prompt_stuck_age_threshold_secs: i64) -> bool {
    first_seen_secs_ago >= prompt_stuck_age_threshold_secs
}

/// Rate-limits recovery attempts for the prompt-stuck detector: a recovery
/// may fire only if at least `cooldown_secs` have elapsed since the last
/// one, per spec §4.G "recoveries are rate-limited by a cooldown".
pub fn prompt_recovery_allowed(secs_since_last_recovery: Option<i64>, cooldown_secs: i64) -> bool {
    match secs_since_last_recovery {
        Some(elapsed) => elapsed >= cooldown_secs,
        None => true,
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
