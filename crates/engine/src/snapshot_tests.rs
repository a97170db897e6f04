use super::*;
use loom_core::test_support::{issue, pr};

#[test]
fn promotable_proposals_exclude_claimed_and_closed_issues() {
    let issues = vec![
        issue(1, &[labels::ARCHITECT]),
        issue(2, &[labels::HERMIT, labels::BUILDING]),
        issue(3, &[labels::CURATED]),
        issue(4, &[labels::ISSUE]),
    ];
    let snapshot = build_snapshot_from(issues, vec![], false, 100);
    let numbers: Vec<u64> = snapshot.promotable_proposals.iter().map(|i| i.number).collect();
    assert_eq!(numbers, vec![1, 3]);
}

#[test]
fn ready_issues_require_loom_issue_label_and_open_state() {
    let mut closed = issue(5, &[labels::ISSUE]);
    closed.state = "CLOSED".to_string();
    let issues = vec![issue(6, &[labels::ISSUE]), closed, issue(7, &[labels::BUILDING])];
    let snapshot = build_snapshot_from(issues, vec![], false, 100);
    let numbers: Vec<u64> = snapshot.ready_issues.iter().map(|i| i.number).collect();
    assert_eq!(numbers, vec![6]);
}

#[test]
fn spinning_prs_require_at_least_three_review_cycles() {
    let mut spinning = pr(10, &[labels::PR]);
    spinning.review_cycles = 3;
    spinning.linked_issue = Some(101);
    let mut not_spinning = pr(11, &[labels::PR]);
    not_spinning.review_cycles = 2;

    let snapshot = build_snapshot_from(vec![], vec![spinning, not_spinning], false, 100);
    assert_eq!(snapshot.spinning_prs.len(), 1);
    assert_eq!(snapshot.spinning_prs[0].pr_number, 10);
    assert_eq!(snapshot.spinning_prs[0].linked_issue, Some(101));
}

#[test]
fn recommended_actions_follow_from_snapshot_contents() {
    let snapshot = build_snapshot_from(vec![issue(1, &[labels::ISSUE])], vec![], false, 1);
    assert_eq!(snapshot.recommended_actions(), vec!["spawn_shepherds"]);
}

#[test]
fn parse_issue_reads_gh_style_label_objects() {
    let value = serde_json::json!({
        "number": 42,
        "title": "t",
        "labels": [{"name": "loom:issue"}],
        "state": "OPEN",
    });
    let issue = parse_issue(&value).unwrap();
    assert_eq!(issue.number, 42);
    assert!(issue.has_label("loom:issue"));
}

#[test]
fn parse_pr_reads_review_decision_and_cycles() {
    let value = serde_json::json!({
        "number": 7,
        "title": "t",
        "labels": [],
        "state": "OPEN",
        "reviewDecision": "CHANGES_REQUESTED",
        "review_cycles": 4,
        "linked_issue": 99,
    });
    let pr = parse_pr(&value).unwrap();
    assert_eq!(pr.review_decision, "CHANGES_REQUESTED");
    assert_eq!(pr.review_cycles, 4);
    assert_eq!(pr.linked_issue, Some(99));
}
