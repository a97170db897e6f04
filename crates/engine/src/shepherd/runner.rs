// SPDX-License-Identifier: MIT

//! The shepherd phase runner itself: drives one issue through
//! `[curator, approval, builder, judge, doctor, merge]`, supervising each
//! phase's worker session and reporting exit codes per spec §4.G.
//!
//! Grounded on `loom_tools/shepherd/{exit_codes.py,errors.py,phases/*.py}`
//! for exact semantics and on the teacher's
//! `oj-engine::runtime::handlers::worker::{dispatch,lifecycle,polling}`
//! split for the Rust module shape — `ShutdownSignal`/`AgentStuckError`
//! become the `PhaseResult` value type per spec §9 REDESIGN FLAGS rather
//! than exceptions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use loom_adapters::platform::{Entity, PlatformClient};
use loom_adapters::session::SessionAdapter;
use loom_core::clock::Clock;
use loom_core::issue::{Issue, Pr};
use loom_core::labels;
use loom_core::shepherd::{Milestone, ShepherdExitCode, ShepherdProgress};
use loom_storage::StateStore;

use super::monitor::{
    idle_action, is_actively_processing, pending_prompt_visible, prompt_is_stuck,
    prompt_recovery_allowed, CriticalAction, IdleAction,
};
use super::phases::{
    approval_disposition, curator_already_skippable, from_judge_precondition_holds,
    skipped_by_from, ApprovalDisposition, PhaseName,
};
use crate::config::Config;

/// Marker a builder-phase worker writes to its session's scrollback when it
/// concludes the issue needs no code changes, the pane-text equivalent of a
/// phase-contract artifact for the one phase whose outcome isn't a platform
/// label/PR change. No direct teacher counterpart; a minimal, observable
/// convention for an otherwise unspecified external-worker signal.
pub const NO_CHANGES_MARKER: &str = "LOOM_NO_CHANGES_NEEDED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    Success,
    Failed,
    Shutdown,
    Stuck,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct PhaseResult {
    pub status: PhaseStatus,
    pub exit_code: ShepherdExitCode,
    pub message: Option<String>,
    pub data: serde_json::Value,
}

impl PhaseResult {
    fn new(status: PhaseStatus, exit_code: ShepherdExitCode, message: impl Into<String>) -> Self {
        Self {
            status,
            exit_code,
            message: Some(message.into()),
            data: serde_json::Value::Null,
        }
    }
}

/// Tracks the distinct "prompt-stuck" detector's state across polls of a
/// single phase session: when a pending prompt was first seen, and when a
/// recovery keypress was last sent, per spec §4.G.
#[derive(Debug, Default)]
struct PromptStuckTracker {
    first_seen_at: Option<i64>,
    last_recovery_at: Option<i64>,
}

impl PromptStuckTracker {
    /// Observe the current pane text at `now`; if a prompt has been stuck
    /// long enough and recovery isn't on cooldown, returns `true` and
    /// records the recovery attempt.
    fn observe(&mut self, pane_text: &str, now: i64, age_threshold_secs: i64, cooldown_secs: i64) -> bool {
        if !pending_prompt_visible(pane_text) {
            self.first_seen_at = None;
            return false;
        }
        let first_seen = *self.first_seen_at.get_or_insert(now);
        if !prompt_is_stuck(now - first_seen, age_threshold_secs) {
            return false;
        }
        let since_last = self.last_recovery_at.map(|at| now - at);
        if !prompt_recovery_allowed(since_last, cooldown_secs) {
            return false;
        }
        self.last_recovery_at = Some(now);
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunMode {
    pub force: bool,
    pub allow_dirty_main: bool,
}

/// Shared cancellation flag, set when the runner observes a shutdown
/// signal (spec §5 "Cancellation": the stop signal is the sole
/// cancellation channel; shepherds terminate themselves on detecting it).
#[derive(Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct PhaseRunner {
    platform: Arc<dyn PlatformClient>,
    session: Arc<dyn SessionAdapter>,
    store: StateStore,
    clock: Arc<dyn Clock>,
    config: Config,
    shutdown: ShutdownFlag,
    /// Real-time granularity between pane captures while monitoring a
    /// phase. A production runner uses a few seconds; tests override this
    /// to keep the monitoring loop fast.
    poll_sleep: Duration,
}

impl PhaseRunner {
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        session: Arc<dyn SessionAdapter>,
        store: StateStore,
        clock: Arc<dyn Clock>,
        config: Config,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            platform,
            session,
            store,
            clock,
            config,
            shutdown,
            poll_sleep: Duration::from_secs(2),
        }
    }

    pub fn with_poll_sleep(mut self, poll_sleep: Duration) -> Self {
        self.poll_sleep = poll_sleep;
        self
    }

    fn now(&self) -> i64 {
        self.clock.now_epoch_secs()
    }

    fn session_name(&self, phase: PhaseName, issue: u64) -> String {
        format!("shepherd-{}-{}", phase.role(), issue)
    }

    async fn fetch_issue(&self, issue_number: u64) -> Option<Issue> {
        let fields = vec![
            "number".to_string(),
            "title".to_string(),
            "labels".to_string(),
            "state".to_string(),
        ];
        let value = self.platform.view(Entity::Issue, issue_number, &fields).await?;
        crate::snapshot::parse_issue(&value)
    }

    async fn fetch_pr(&self, pr_number: u64) -> Option<Pr> {
        let fields = vec![
            "number".to_string(),
            "title".to_string(),
            "labels".to_string(),
            "state".to_string(),
            "reviewDecision".to_string(),
        ];
        let value = self.platform.view(Entity::Pr, pr_number, &fields).await?;
        crate::snapshot::parse_pr(&value)
    }

    /// Best-effort lookup of an open PR linked to `issue_number`, used by
    /// the builder phase's contract check. Scans open PRs since the
    /// platform client has no direct "PR for issue" query, per spec §4.C's
    /// `list`-only surface. `linked_issue` is the platform client's own
    /// derivation (closing keyword in the body); a direct `issue-<n>` match
    /// on the head branch is tried as well in case the PR body never named
    /// the issue it closes.
    async fn find_pr_for_issue(&self, issue_number: u64) -> Option<Pr> {
        let fields = vec![
            "number".to_string(),
            "title".to_string(),
            "labels".to_string(),
            "state".to_string(),
            "reviewDecision".to_string(),
        ];
        let prs = self
            .platform
            .list(
                Entity::Pr,
                loom_adapters::platform::ListParams {
                    labels: &[],
                    state: "open",
                    fields: &fields,
                    search: None,
                    head: None,
                    limit: None,
                },
            )
            .await;
        prs.iter().filter_map(crate::snapshot::parse_pr).find(|pr| {
            pr.linked_issue == Some(issue_number)
                || loom_core::issue::issue_from_branch_name(&pr.head_branch) == Some(issue_number)
        })
    }

    fn record(&self, progress: &mut ShepherdProgress, milestone: Milestone) {
        if progress.record_milestone(milestone).is_ok() {
            let _ = self.store.write_progress(progress);
        }
    }

    /// Run every phase for `issue_number`, from `from_phase` (or the start)
    /// onward, applying skip rules, retry policy, and the terminal
    /// blocking transition. Returns the granular exit code of spec §4.G.
    pub async fn run(
        &self,
        issue_number: u64,
        task_id: &str,
        from_phase: Option<PhaseName>,
        mode: RunMode,
    ) -> ShepherdExitCode {
        let mut progress = self.store.read_progress(task_id);
        if progress.milestones.is_empty() {
            self.record(&mut progress, Milestone::Started { epoch_secs: self.now() });
        }

        let Some(issue) = self.fetch_issue(issue_number).await else {
            self.finish(&mut progress, ShepherdExitCode::TransientError, "issue fetch failed");
            return ShepherdExitCode::TransientError;
        };

        let mut pr_number: Option<u64> = None;

        if let Some(start) = from_phase {
            if start.index() >= PhaseName::Judge.index() {
                // Starting mid-pipeline past builder: the PR already exists
                // on the platform, so recover its number the same way the
                // builder phase itself would have.
                let pr = self.find_pr_for_issue(issue_number).await;
                if start == PhaseName::Judge
                    && !from_judge_precondition_holds(Some(PhaseName::Judge), pr.as_ref())
                {
                    self.finish(&mut progress, ShepherdExitCode::NoPr, "--from judge without loom:pr");
                    return ShepherdExitCode::NoPr;
                }
                pr_number = pr.map(|pr| pr.number);
                if pr_number.is_none() {
                    self.finish(&mut progress, ShepherdExitCode::NoPr, "no PR found for --from start phase");
                    return ShepherdExitCode::NoPr;
                }
            }
        }

        let start_idx = from_phase.map(PhaseName::index).unwrap_or(0);

        for phase in PhaseName::ORDER.into_iter().skip(start_idx) {
            if self.shutdown.is_set() {
                self.finish(&mut progress, ShepherdExitCode::Shutdown, "shutdown signal observed");
                return ShepherdExitCode::Shutdown;
            }

            if skipped_by_from(from_phase, phase) {
                continue;
            }

            let outcome = match phase {
                PhaseName::Curator => self.run_curator(&mut progress, &issue).await,
                PhaseName::Approval => self.run_approval(&mut progress, issue_number, mode).await,
                PhaseName::Builder => self.run_builder(&mut progress, issue_number).await,
                PhaseName::Judge => {
                    self.run_judge(&mut progress, pr_number.or_else(|| self.cached_pr_hint())).await
                }
                PhaseName::Doctor => self.run_doctor(&mut progress, pr_number).await,
                PhaseName::Merge => self.run_merge(&mut progress, pr_number, mode).await,
            };

            if let PhaseResult { data, .. } = &outcome {
                if let Some(found) = data.get("pr_number").and_then(|v| v.as_u64()) {
                    pr_number = Some(found);
                    progress.pr_number = Some(found);
                }
                if data.get("pr_merged").and_then(|v| v.as_bool()).unwrap_or(false) {
                    progress.pr_merged = true;
                }
            }

            match outcome.status {
                PhaseStatus::Skipped => continue,
                PhaseStatus::Success => continue,
                PhaseStatus::Shutdown => {
                    self.finish(&mut progress, ShepherdExitCode::Shutdown, "shutdown signal observed");
                    return ShepherdExitCode::Shutdown;
                }
                PhaseStatus::Stuck | PhaseStatus::Failed => {
                    self.apply_blocking_transition(issue_number, outcome.exit_code, &outcome.message)
                        .await;
                    self.finish(
                        &mut progress,
                        outcome.exit_code,
                        outcome.message.unwrap_or_default(),
                    );
                    return outcome.exit_code;
                }
            }
        }

        self.finish(&mut progress, ShepherdExitCode::Success, "merged or approved");
        ShepherdExitCode::Success
    }

    /// Placeholder for future PR-caching between loop iterations; kept as
    /// its own method so judge can be invoked standalone (`--from judge`)
    /// without threading the builder's return value through.
    fn cached_pr_hint(&self) -> Option<u64> {
        None
    }

    fn finish(&self, progress: &mut ShepherdProgress, exit_code: ShepherdExitCode, message: impl Into<String>) {
        let milestone = if exit_code == ShepherdExitCode::Success {
            Milestone::Completed { exit_code: exit_code.code(), epoch_secs: self.now() }
        } else {
            Milestone::Errored {
                exit_code: exit_code.code(),
                message: message.into(),
                epoch_secs: self.now(),
            }
        };
        self.record(progress, milestone);
    }

    async fn apply_blocking_transition(
        &self,
        issue_number: u64,
        exit_code: ShepherdExitCode,
        reason: &Option<String>,
    ) {
        if !exit_code.blocks_issue() {
            return;
        }
        self.platform
            .edit_labels(Entity::Issue, issue_number, &[labels::BLOCKED.to_string()], &[labels::BUILDING.to_string()])
            .await;
        let mut history = self.store.read_stuck_history();
        history.record_failure(issue_number, exit_code.code(), self.now());
        let _ = self.store.write_stuck_history(&history);
        let body = format!(
            "Shepherd blocked: {} ({})",
            exit_code.describe(),
            reason.clone().unwrap_or_default()
        );
        self.platform.comment(Entity::Issue, issue_number, &body).await;
    }

    async fn run_curator(&self, progress: &mut ShepherdProgress, issue: &Issue) -> PhaseResult {
        if curator_already_skippable(issue) {
            return PhaseResult {
                status: PhaseStatus::Skipped,
                exit_code: ShepherdExitCode::Skipped,
                message: None,
                data: serde_json::Value::Null,
            };
        }
        self.record(progress, Milestone::PhaseEntered { phase: PhaseName::Curator.as_str().into(), epoch_secs: self.now() });
        self.run_supervised_phase(progress, PhaseName::Curator, issue.number, self.config.curator_timeout_secs, |_pane| true)
            .await
    }

    async fn run_approval(&self, progress: &mut ShepherdProgress, issue_number: u64, mode: RunMode) -> PhaseResult {
        let Some(issue) = self.fetch_issue(issue_number).await else {
            return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TransientError, "issue fetch failed");
        };
        match approval_disposition(&issue, self.config.force_mode || mode.force) {
            ApprovalDisposition::Skip => PhaseResult {
                status: PhaseStatus::Skipped,
                exit_code: ShepherdExitCode::Skipped,
                message: None,
                data: serde_json::Value::Null,
            },
            ApprovalDisposition::AutoApprove => {
                self.platform.edit_labels(Entity::Issue, issue_number, &[labels::ISSUE.to_string()], &[]).await;
                PhaseResult {
                    status: PhaseStatus::Success,
                    exit_code: ShepherdExitCode::Success,
                    message: None,
                    data: serde_json::Value::Null,
                }
            }
            ApprovalDisposition::Run => {
                self.record(progress, Milestone::PhaseEntered { phase: "approval".into(), epoch_secs: self.now() });
                self.poll_approval(progress, issue_number).await
            }
        }
    }

    /// Polls at `approval_poll_interval_secs`, invalidating the label cache
    /// (re-fetching) each time, emitting a `heartbeat` each poll so the
    /// daemon doesn't reclaim the shepherd as stuck, timing out with code 4
    /// per spec §4.G "Approval phase specifics".
    async fn poll_approval(&self, progress: &mut ShepherdProgress, issue_number: u64) -> PhaseResult {
        let deadline = self.now() + self.config.approval_timeout_secs;
        loop {
            if self.shutdown.is_set() {
                return PhaseResult::new(PhaseStatus::Shutdown, ShepherdExitCode::Shutdown, "shutdown during approval");
            }
            self.record(progress, Milestone::Heartbeat { phase: "approval".into(), epoch_secs: self.now() });
            if let Some(issue) = self.fetch_issue(issue_number).await {
                if issue.has_label(labels::ISSUE) || issue.has_label(labels::BUILDING) {
                    return PhaseResult {
                        status: PhaseStatus::Success,
                        exit_code: ShepherdExitCode::Success,
                        message: None,
                        data: serde_json::Value::Null,
                    };
                }
            }
            if self.now() >= deadline {
                return PhaseResult::new(PhaseStatus::Stuck, ShepherdExitCode::Stuck, "approval timed out");
            }
            tokio::time::sleep(self.poll_sleep).await;
        }
    }

    /// Builder has two distinct contractual artifacts (a PR appears, or the
    /// worker declares no changes are needed via [`NO_CHANGES_MARKER`]), so
    /// it polls both each iteration rather than going through
    /// [`Self::run_supervised_phase`]'s single pane-only predicate.
    async fn run_builder(&self, progress: &mut ShepherdProgress, issue_number: u64) -> PhaseResult {
        self.record(progress, Milestone::PhaseEntered { phase: "builder".into(), epoch_secs: self.now() });
        let name = self.session_name(PhaseName::Builder, issue_number);
        if self.session.spawn(&name, std::path::Path::new("."), "true", &[]).await.is_err() {
            return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TransientError, "failed to spawn worker session");
        }

        let started_at = self.now();
        let mut last_active_at = started_at;
        let deadline = started_at + self.config.builder_timeout_secs;
        let mut retries_left = self.config.phase_retry_budget;
        let mut prompt_tracker = PromptStuckTracker::default();

        loop {
            if self.shutdown.is_set() {
                self.session.kill(&name).await;
                return PhaseResult::new(PhaseStatus::Shutdown, ShepherdExitCode::Shutdown, "shutdown during builder");
            }

            if let Some(pr) = self.find_pr_for_issue(issue_number).await {
                self.record(progress, Milestone::PrCreated { pr_number: pr.number, epoch_secs: self.now() });
                self.record(progress, Milestone::PhaseContractSatisfied { phase: "builder".into(), epoch_secs: self.now() });
                return PhaseResult {
                    status: PhaseStatus::Success,
                    exit_code: ShepherdExitCode::Success,
                    message: None,
                    data: serde_json::json!({"pr_number": pr.number}),
                };
            }

            let pane = self.session.capture_pane(&name).await;
            if pane.contains(NO_CHANGES_MARKER) {
                return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::NoChangesNeeded, "builder reported no changes needed");
            }

            let now = self.now();
            if prompt_tracker.observe(
                &pane,
                now,
                self.config.prompt_stuck_age_threshold_secs,
                self.config.prompt_stuck_cooldown_secs,
            ) {
                let _ = self.session.send_keys(&name, "Enter", &[]).await;
                self.record(progress, Milestone::Heartbeat { phase: "builder".into(), epoch_secs: now });
            }

            if is_actively_processing(&pane) {
                last_active_at = now;
            } else {
                let idle_secs = now - last_active_at;
                match idle_action(idle_secs, self.config.warning_threshold_secs, self.config.critical_threshold_secs, CriticalAction::Retry) {
                    IdleAction::Warn => {
                        self.record(progress, Milestone::Heartbeat { phase: "builder".into(), epoch_secs: now });
                    }
                    IdleAction::Critical(_) => {
                        self.session.kill(&name).await;
                        if retries_left == 0 {
                            return PhaseResult::new(PhaseStatus::Stuck, ShepherdExitCode::Stuck, "builder stuck, retry budget exhausted");
                        }
                        retries_left -= 1;
                        if self.session.spawn(&name, std::path::Path::new("."), "true", &[]).await.is_err() {
                            return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TransientError, "failed to respawn worker session");
                        }
                        last_active_at = self.now();
                    }
                    IdleAction::None => {}
                }
            }

            if now >= deadline {
                self.session.kill(&name).await;
                return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::NoPr, "builder produced no PR");
            }

            tokio::time::sleep(self.poll_sleep).await;
        }
    }

    async fn run_judge(&self, progress: &mut ShepherdProgress, pr_number: Option<u64>) -> PhaseResult {
        let Some(pr_number) = pr_number else {
            return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::NoPr, "no PR to judge");
        };
        self.record(progress, Milestone::PhaseEntered { phase: "judge".into(), epoch_secs: self.now() });
        let outcome = self
            .run_supervised_phase(progress, PhaseName::Judge, pr_number, self.config.judge_timeout_secs, |_pane| true)
            .await;
        if outcome.status != PhaseStatus::Success {
            return outcome;
        }
        let Some(pr) = self.fetch_pr(pr_number).await else {
            return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TransientError, "pr fetch failed after judge");
        };
        if pr.has_label(labels::PR) {
            self.record(
                progress,
                Milestone::PhaseContractSatisfied { phase: "judge".into(), epoch_secs: self.now() },
            );
            PhaseResult { status: PhaseStatus::Success, exit_code: ShepherdExitCode::Success, message: None, data: serde_json::json!({"pr_number": pr_number}) }
        } else if pr.has_label(labels::CHANGES_REQUESTED) {
            PhaseResult { status: PhaseStatus::Success, exit_code: ShepherdExitCode::Success, message: None, data: serde_json::json!({"pr_number": pr_number, "changes_requested": true}) }
        } else {
            PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TestsFailed, "judge produced neither loom:pr nor loom:changes-requested")
        }
    }

    async fn run_doctor(&self, progress: &mut ShepherdProgress, pr_number: Option<u64>) -> PhaseResult {
        let Some(pr_number) = pr_number else {
            return PhaseResult { status: PhaseStatus::Skipped, exit_code: ShepherdExitCode::Skipped, message: None, data: serde_json::Value::Null };
        };
        let Some(pr) = self.fetch_pr(pr_number).await else {
            return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TransientError, "pr fetch failed before doctor");
        };
        if !pr.has_label(labels::CHANGES_REQUESTED) {
            return PhaseResult { status: PhaseStatus::Skipped, exit_code: ShepherdExitCode::Skipped, message: None, data: serde_json::json!({"pr_number": pr_number}) };
        }
        self.record(progress, Milestone::PhaseEntered { phase: "doctor".into(), epoch_secs: self.now() });
        let outcome = self
            .run_supervised_phase(progress, PhaseName::Doctor, pr_number, self.config.doctor_timeout_secs, |_pane| true)
            .await;
        if outcome.status != PhaseStatus::Success {
            return outcome;
        }
        let Some(pr_after) = self.fetch_pr(pr_number).await else {
            return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TransientError, "pr fetch failed after doctor");
        };
        if pr_after.has_label(labels::CHANGES_REQUESTED) {
            PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TestsFailed, "tests still failing after doctor")
        } else {
            PhaseResult { status: PhaseStatus::Success, exit_code: ShepherdExitCode::Success, message: None, data: serde_json::json!({"pr_number": pr_number}) }
        }
    }

    async fn run_merge(&self, progress: &mut ShepherdProgress, pr_number: Option<u64>, mode: RunMode) -> PhaseResult {
        let Some(pr_number) = pr_number else {
            return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::NoPr, "no PR to merge");
        };
        if !mode.force {
            let Some(pr) = self.fetch_pr(pr_number).await else {
                return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TransientError, "pr fetch failed before merge");
            };
            return if pr.has_label(labels::PR) {
                PhaseResult { status: PhaseStatus::Success, exit_code: ShepherdExitCode::Success, message: None, data: serde_json::json!({"pr_number": pr_number}) }
            } else {
                PhaseResult::new(PhaseStatus::Stuck, ShepherdExitCode::Stuck, "awaiting external champion merge")
            };
        }

        self.record(progress, Milestone::PhaseEntered { phase: "merge".into(), epoch_secs: self.now() });
        let merged = self.platform.merge_pr(pr_number, true).await;
        if !merged {
            self.record(progress, Milestone::TransientError { phase: "merge".into(), error: "merge_pr failed".into(), pattern: "merge".into(), epoch_secs: self.now() });
            return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TransientError, "merge command failed");
        }
        let Some(pr) = self.fetch_pr(pr_number).await else {
            return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TransientError, "pr fetch failed after merge");
        };
        if pr.is_merged() {
            PhaseResult { status: PhaseStatus::Success, exit_code: ShepherdExitCode::Success, message: None, data: serde_json::json!({"pr_number": pr_number, "pr_merged": true}) }
        } else {
            PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TransientError, "pr state did not reach MERGED")
        }
    }

    /// Spawn a worker session for `phase`, then monitor the pane until
    /// `validate` reports the contractual artifact is present or the
    /// timeout elapses, applying the idle-time escalation ladder and the
    /// one-retry policy of spec §4.G along the way.
    async fn run_supervised_phase(
        &self,
        progress: &mut ShepherdProgress,
        phase: PhaseName,
        subject_number: u64,
        timeout_secs: i64,
        validate: impl Fn(&str) -> bool,
    ) -> PhaseResult {
        let name = self.session_name(phase, subject_number);
        let mut retries_left = self.config.phase_retry_budget;

        loop {
            if self.session.spawn(&name, std::path::Path::new("."), "true", &[]).await.is_err() {
                return PhaseResult::new(PhaseStatus::Failed, ShepherdExitCode::TransientError, "failed to spawn worker session");
            }

            let started_at = self.now();
            let mut last_active_at = started_at;
            let deadline = started_at + timeout_secs;
            let mut prompt_tracker = PromptStuckTracker::default();

            loop {
                if self.shutdown.is_set() {
                    self.session.kill(&name).await;
                    return PhaseResult::new(PhaseStatus::Shutdown, ShepherdExitCode::Shutdown, "shutdown during phase");
                }

                let pane = self.session.capture_pane(&name).await;
                if validate(&pane) {
                    self.record(progress, Milestone::PhaseContractSatisfied { phase: phase.as_str().into(), epoch_secs: self.now() });
                    return PhaseResult {
                        status: PhaseStatus::Success,
                        exit_code: ShepherdExitCode::Success,
                        message: None,
                        data: serde_json::Value::Null,
                    };
                }

                let now = self.now();
                if prompt_tracker.observe(
                    &pane,
                    now,
                    self.config.prompt_stuck_age_threshold_secs,
                    self.config.prompt_stuck_cooldown_secs,
                ) {
                    let _ = self.session.send_keys(&name, "Enter", &[]).await;
                    self.record(progress, Milestone::Heartbeat { phase: phase.as_str().into(), epoch_secs: now });
                }

                if is_actively_processing(&pane) {
                    last_active_at = now;
                } else {
                    let idle_secs = now - last_active_at;
                    match idle_action(
                        idle_secs,
                        self.config.warning_threshold_secs,
                        self.config.critical_threshold_secs,
                        CriticalAction::Retry,
                    ) {
                        IdleAction::Warn => {
                            self.record(progress, Milestone::Heartbeat { phase: phase.as_str().into(), epoch_secs: now });
                        }
                        IdleAction::Critical(_) => {
                            self.session.kill(&name).await;
                            if retries_left == 0 {
                                return PhaseResult::new(PhaseStatus::Stuck, ShepherdExitCode::Stuck, "agent stuck, retry budget exhausted");
                            }
                            retries_left -= 1;
                            break;
                        }
                        IdleAction::None => {}
                    }
                }

                if now >= deadline {
                    self.session.kill(&name).await;
                    return PhaseResult::new(PhaseStatus::Stuck, ShepherdExitCode::Stuck, "phase timed out");
                }

                tokio::time::sleep(self.poll_sleep).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
