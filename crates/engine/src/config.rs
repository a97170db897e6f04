// SPDX-License-Identifier: MIT

//! Daemon/shepherd configuration loaded from `LOOM_*` environment variables,
//! grounded 1:1 on `loom_tools/daemon_v2/config.py::DaemonConfig.from_env`
//! and `loom_tools/shepherd/config.py` (recovered from `original_source/`).

use loom_core::envutil::{env_bool, env_int, env_str};

/// Issue-selection order for `spawn_shepherds`, per spec §4.F step 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueStrategy {
    #[default]
    Fifo,
    Lifo,
}

impl IssueStrategy {
    fn from_env_str(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lifo" => Self::Lifo,
            _ => Self::Fifo,
        }
    }
}

/// The support-role roster, recovered from `original_source/` since spec.md
/// names the concept generically ("periodic out-of-band worker") without
/// fixing the roster.
pub const SUPPORT_ROLES: &[&str] = &["guide", "champion", "doctor", "auditor", "judge", "curator"];

/// Every `LOOM_*`-driven knob the engine needs, loaded once at daemon
/// startup. Booleans/ints follow `envutil`'s truthy-token and parse-or-
/// default rules throughout.
#[derive(Debug, Clone)]
pub struct Config {
    pub poll_interval_secs: i64,
    pub max_shepherds: u32,
    pub force_mode: bool,
    pub auto_build: bool,
    pub issue_threshold: i64,
    pub issue_strategy: IssueStrategy,
    pub timeout_min: i64,

    /// No-progress grace period before `reclaim_stale` forces a shepherd
    /// back to idle, per spec §4.F.
    pub stale_grace_secs: i64,

    /// Per-phase agent-idle thresholds (spec §4.G monitoring contract).
    pub warning_threshold_secs: i64,
    pub critical_threshold_secs: i64,
    pub prompt_stuck_age_threshold_secs: i64,
    pub prompt_stuck_cooldown_secs: i64,

    /// Default retry budget per phase (spec §4.G "Retry policy").
    pub phase_retry_budget: u32,

    pub approval_timeout_secs: i64,
    pub approval_poll_interval_secs: i64,
    pub builder_timeout_secs: i64,
    pub judge_timeout_secs: i64,
    pub doctor_timeout_secs: i64,
    pub merge_timeout_secs: i64,
    pub curator_timeout_secs: i64,

    /// `LOOM_<ROLE>_INTERVAL` per support role, in the same order as
    /// [`SUPPORT_ROLES`].
    pub support_role_intervals: Vec<(String, i64)>,
}

impl Config {
    /// Load from the process environment. `LOOM_FORCE_MODE` implies
    /// `LOOM_AUTO_BUILD`, per spec §6.
    pub fn from_env() -> Self {
        let force_mode = env_bool("LOOM_FORCE_MODE", false);
        let auto_build = force_mode || env_bool("LOOM_AUTO_BUILD", false);

        let support_role_intervals = SUPPORT_ROLES
            .iter()
            .map(|role| {
                let var = format!("LOOM_{}_INTERVAL", role.to_ascii_uppercase());
                (role.to_string(), env_int(&var, 1800))
            })
            .collect();

        Self {
            poll_interval_secs: env_int("LOOM_POLL_INTERVAL", 30),
            max_shepherds: env_int("LOOM_MAX_SHEPHERDS", 10).max(0) as u32,
            force_mode,
            auto_build,
            issue_threshold: env_int("LOOM_ISSUE_THRESHOLD", 3),
            issue_strategy: IssueStrategy::from_env_str(&env_str("LOOM_ISSUE_STRATEGY", "fifo")),
            timeout_min: env_int("LOOM_TIMEOUT_MIN", 0),
            stale_grace_secs: env_int("LOOM_STALE_GRACE_SECS", 900),
            warning_threshold_secs: env_int("LOOM_WARNING_THRESHOLD_SECS", 300),
            critical_threshold_secs: env_int("LOOM_CRITICAL_THRESHOLD_SECS", 900),
            prompt_stuck_age_threshold_secs: env_int("LOOM_PROMPT_STUCK_AGE_THRESHOLD_SECS", 120),
            prompt_stuck_cooldown_secs: env_int("LOOM_PROMPT_STUCK_COOLDOWN_SECS", 300),
            phase_retry_budget: env_int("LOOM_PHASE_RETRY_BUDGET", 1).max(0) as u32,
            approval_timeout_secs: env_int("LOOM_APPROVAL_TIMEOUT_SECS", 3600),
            approval_poll_interval_secs: env_int("LOOM_APPROVAL_POLL_INTERVAL_SECS", 60),
            builder_timeout_secs: env_int("LOOM_BUILDER_TIMEOUT_SECS", 7200),
            judge_timeout_secs: env_int("LOOM_JUDGE_TIMEOUT_SECS", 3600),
            doctor_timeout_secs: env_int("LOOM_DOCTOR_TIMEOUT_SECS", 3600),
            merge_timeout_secs: env_int("LOOM_MERGE_TIMEOUT_SECS", 900),
            curator_timeout_secs: env_int("LOOM_CURATOR_TIMEOUT_SECS", 1800),
            support_role_intervals,
        }
    }

    pub fn support_role_interval(&self, role: &str) -> Option<i64> {
        self.support_role_intervals
            .iter()
            .find(|(name, _)| name == role)
            .map(|(_, interval)| *interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            max_shepherds: 10,
            force_mode: false,
            auto_build: false,
            issue_threshold: 3,
            issue_strategy: IssueStrategy::Fifo,
            timeout_min: 0,
            stale_grace_secs: 900,
            warning_threshold_secs: 300,
            critical_threshold_secs: 900,
            prompt_stuck_age_threshold_secs: 120,
            prompt_stuck_cooldown_secs: 300,
            phase_retry_budget: 1,
            approval_timeout_secs: 3600,
            approval_poll_interval_secs: 60,
            builder_timeout_secs: 7200,
            judge_timeout_secs: 3600,
            doctor_timeout_secs: 3600,
            merge_timeout_secs: 900,
            curator_timeout_secs: 1800,
            support_role_intervals: SUPPORT_ROLES.iter().map(|r| (r.to_string(), 1800)).collect(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
