// SPDX-License-Identifier: MIT

//! Snapshot builder (component E): produces the immutable per-iteration
//! view the daemon loop hands to the action executors, per spec §3/§4.E.
//!
//! New logic with no direct teacher counterpart for the domain (oddjobs has
//! no issue/PR label pipeline), but structured the way the teacher's
//! `oj-engine::decision_builder` derives an immutable view from live state:
//! a plain async function that fans out to the platform client and returns
//! an owned struct, not a trait object.

use loom_adapters::platform::{CiStatus, Entity, ListParams, PlatformClient};
use loom_core::issue::{Issue, Pr};
use loom_core::labels;
use loom_core::snapshot::{Snapshot, SpinningPr};

/// A PR's review-cycle history is spinning once it has gone through this
/// many `changes-requested -> commit(s) pushed` round trips. REDESIGN FLAGS
/// open question, fixed here per spec §4.E/§9: the implementer tightens the
/// Open Question to "≥3 cycles counted off review/commit timeline", backed
/// by `review_cycles`, a field the platform client derives from the PR's
/// review/commit timeline before the snapshot builder ever sees it (see
/// `loom_adapters::platform::gh::derive_review_cycles_from_json` and
/// DESIGN.md).
pub const SPINNING_CYCLE_THRESHOLD: u32 = 3;

fn labels_from_json(value: &serde_json::Value) -> Vec<String> {
    value
        .get("labels")
        .and_then(|l| l.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|l| {
                    l.get("name")
                        .and_then(|n| n.as_str())
                        .or_else(|| l.as_str())
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn parse_issue(value: &serde_json::Value) -> Option<Issue> {
    Some(Issue {
        number: value.get("number")?.as_u64()?,
        title: value
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        labels: labels_from_json(value),
        state: value
            .get("state")
            .and_then(|v| v.as_str())
            .unwrap_or("OPEN")
            .to_string(),
    })
}

pub(crate) fn parse_pr(value: &serde_json::Value) -> Option<Pr> {
    Some(Pr {
        number: value.get("number")?.as_u64()?,
        title: value
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        labels: labels_from_json(value),
        state: value
            .get("state")
            .and_then(|v| v.as_str())
            .unwrap_or("OPEN")
            .to_string(),
        review_decision: value
            .get("reviewDecision")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        head_branch: value
            .get("headRefName")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        linked_issue: value.get("linked_issue").and_then(|v| v.as_u64()),
        review_cycles: value
            .get("review_cycles")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32,
    })
}

/// Is `issue` a promotable proposal: bears one of the proposal labels, is
/// not already `loom:issue`, is open, and is not currently claimed
/// (`loom:building`)? Per spec §4.E.
pub fn is_promotable(issue: &Issue) -> bool {
    if !issue.state.eq_ignore_ascii_case("OPEN") {
        return false;
    }
    if issue.has_label(labels::ISSUE) || issue.has_label(labels::BUILDING) {
        return false;
    }
    labels::PROMOTABLE.iter().any(|l| issue.has_label(l))
}

fn is_ready(issue: &Issue) -> bool {
    issue.state.eq_ignore_ascii_case("OPEN") && issue.has_label(labels::ISSUE)
}

fn is_spinning(pr: &Pr) -> SpinningPr {
    SpinningPr {
        pr_number: pr.number,
        review_cycles: pr.review_cycles,
        linked_issue: pr.linked_issue,
    }
}

/// Pure builder: given the already-fetched issues/PRs and CI status, derive
/// the immutable snapshot. Kept separate from the platform-calling wrapper
/// below so action-executor and daemon-loop tests can drive it without a
/// fake platform client in the loop.
pub fn build_snapshot_from(
    issues: Vec<Issue>,
    prs: Vec<Pr>,
    default_branch_ci_failing: bool,
    taken_at_epoch_secs: i64,
) -> Snapshot {
    let promotable_proposals = issues.iter().filter(|i| is_promotable(i)).cloned().collect();
    let ready_issues: Vec<Issue> = issues.into_iter().filter(is_ready).collect();

    let spinning_prs = prs
        .iter()
        .filter(|pr| pr.state.eq_ignore_ascii_case("OPEN") && pr.review_cycles >= SPINNING_CYCLE_THRESHOLD)
        .map(is_spinning)
        .collect();

    Snapshot {
        promotable_proposals,
        ready_issues,
        spinning_prs,
        open_prs: prs.into_iter().filter(|pr| pr.state.eq_ignore_ascii_case("OPEN")).collect(),
        default_branch_ci_failing,
        taken_at_epoch_secs,
    }
}

/// Fan out to the platform client for all issues and open PRs, then build
/// the snapshot. Grounded on `daemon_v2/context.py`'s
/// `get_ready_issues`/`get_promotable_proposals` accessors, which each
/// issue a single `gh issue list` call under the hood.
pub async fn build_snapshot(platform: &dyn PlatformClient, now_epoch_secs: i64) -> Snapshot {
    let fields = vec![
        "number".to_string(),
        "title".to_string(),
        "labels".to_string(),
        "state".to_string(),
    ];
    let pr_fields = vec![
        "number".to_string(),
        "title".to_string(),
        "labels".to_string(),
        "state".to_string(),
        "reviewDecision".to_string(),
    ];

    let queries = vec![
        (
            Entity::Issue,
            ListParams {
                labels: &[],
                state: "open",
                fields: &fields,
                search: None,
                head: None,
                limit: None,
            },
        ),
        (
            Entity::Pr,
            ListParams {
                labels: &[],
                state: "open",
                fields: &pr_fields,
                search: None,
                head: None,
                limit: None,
            },
        ),
    ];

    let mut results = platform.list_many(queries).await.into_iter();
    let issues: Vec<Issue> = results
        .next()
        .unwrap_or_default()
        .iter()
        .filter_map(parse_issue)
        .collect();
    let prs: Vec<Pr> = results
        .next()
        .unwrap_or_default()
        .iter()
        .filter_map(parse_pr)
        .collect();

    let ci_status = platform.default_branch_ci_status().await;
    build_snapshot_from(issues, prs, ci_status == CiStatus::Failing, now_epoch_secs)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
