// SPDX-License-Identifier: MIT

use super::*;
use loom_adapters::FakePlatformClient;
use loom_core::test_support::issue;
use serde_json::json;

fn seed(client: &FakePlatformClient, number: u64, labels: &[&str]) {
    client.seed_issue(
        number,
        json!({
            "number": number,
            "title": format!("issue {number}"),
            "state": "OPEN",
            "labels": labels.iter().map(|l| json!({"name": l})).collect::<Vec<_>>(),
        }),
    );
}

fn snapshot_with(promotable: Vec<loom_core::issue::Issue>) -> Snapshot {
    Snapshot {
        promotable_proposals: promotable,
        ..Snapshot::default()
    }
}

#[tokio::test]
async fn promotes_every_promotable_proposal_unconditionally() {
    let client = FakePlatformClient::new();
    seed(&client, 10, &[labels::ARCHITECT]);
    seed(&client, 20, &[labels::HERMIT]);
    // A huge `ready_issues` count used to suppress promotion entirely;
    // the threshold gate is gone, so it has no bearing here.
    let snapshot = Snapshot {
        promotable_proposals: vec![issue(10, &[labels::ARCHITECT]), issue(20, &[labels::HERMIT])],
        ready_issues: (0..50).map(|n| issue(1000 + n, &[labels::ISSUE])).collect(),
        ..Snapshot::default()
    };

    let promoted = promote_proposals(&client, &snapshot).await;
    assert_eq!(promoted, vec![10, 20]);
}

#[tokio::test]
async fn no_op_when_no_promotable_proposals() {
    let client = FakePlatformClient::new();
    let snapshot = snapshot_with(vec![]);

    let promoted = promote_proposals(&client, &snapshot).await;
    assert!(promoted.is_empty());
}

#[tokio::test]
async fn removes_every_proposal_label_present_and_adds_issue() {
    let client = FakePlatformClient::new();
    seed(&client, 77, &[labels::ARCHITECT, labels::CURATED]);
    let snapshot = snapshot_with(vec![issue(77, &[labels::ARCHITECT, labels::CURATED])]);

    let promoted = promote_proposals(&client, &snapshot).await;
    assert_eq!(promoted, vec![77]);

    let calls = client.calls();
    let edit = calls
        .iter()
        .find_map(|c| match c {
            loom_adapters::platform::PlatformCall::EditLabels { number, add, remove, .. } if *number == 77 => {
                Some((add.clone(), remove.clone()))
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(edit.0, vec![labels::ISSUE.to_string()]);
    assert!(edit.1.contains(&labels::ARCHITECT.to_string()));
    assert!(edit.1.contains(&labels::CURATED.to_string()));
}

#[tokio::test]
async fn a_failed_edit_is_skipped_not_fatal() {
    let client = FakePlatformClient::new();
    // Issue 5 is not seeded in the fake's table, so `edit_labels` fails.
    let snapshot = snapshot_with(vec![issue(5, &[labels::ARCHITECT]), issue(6, &[labels::ARCHITECT])]);
    seed(&client, 6, &[labels::ARCHITECT]);

    let promoted = promote_proposals(&client, &snapshot).await;
    assert_eq!(promoted, vec![6]);
}

#[tokio::test]
async fn promotes_in_ascending_issue_number_order() {
    let client = FakePlatformClient::new();
    seed(&client, 30, &[labels::ARCHITECT]);
    seed(&client, 9, &[labels::ARCHITECT]);
    let snapshot = snapshot_with(vec![issue(30, &[labels::ARCHITECT]), issue(9, &[labels::ARCHITECT])]);

    let promoted = promote_proposals(&client, &snapshot).await;
    assert_eq!(promoted, vec![9, 30]);
}
