// SPDX-License-Identifier: MIT

use super::*;
use serde_json::json;

fn issue_with_labels(number: u64, labels: &[&str]) -> serde_json::Value {
    json!({
        "number": number,
        "title": format!("issue {number}"),
        "state": "OPEN",
        "labels": labels.iter().map(|l| json!({"name": l})).collect::<Vec<_>>(),
    })
}

#[tokio::test]
async fn list_filters_by_all_requested_labels() {
    let client = FakePlatformClient::new();
    client.seed_issue(1, issue_with_labels(1, &["loom:curated"]));
    client.seed_issue(2, issue_with_labels(2, &["loom:curated", "loom:building"]));
    client.seed_issue(3, issue_with_labels(3, &["loom:blocked"]));

    let labels = vec!["loom:curated".to_string()];
    let params = ListParams {
        labels: &labels,
        state: "open",
        fields: &[],
        search: None,
        head: None,
        limit: None,
    };
    let result = client.list(Entity::Issue, params).await;
    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn edit_labels_adds_and_removes() {
    let client = FakePlatformClient::new();
    client.seed_issue(1, issue_with_labels(1, &["loom:curated"]));

    let ok = client
        .edit_labels(
            Entity::Issue,
            1,
            &["loom:building".to_string()],
            &["loom:curated".to_string()],
        )
        .await;
    assert!(ok);

    let view = client.view(Entity::Issue, 1, &[]).await.unwrap();
    let labels: Vec<&str> = view["labels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["loom:building"]);
}

#[tokio::test]
async fn edit_labels_on_unknown_number_reports_failure() {
    let client = FakePlatformClient::new();
    assert!(!client.edit_labels(Entity::Issue, 99, &[], &[]).await);
}

#[tokio::test]
async fn merge_pr_marks_pr_merged() {
    let client = FakePlatformClient::new();
    client.seed_pr(7, json!({"number": 7, "state": "OPEN"}));
    assert!(client.merge_pr(7, true).await);
    let pr = client.view(Entity::Pr, 7, &[]).await.unwrap();
    assert_eq!(pr["state"], "MERGED");
}

#[tokio::test]
async fn default_branch_ci_status_reflects_seeded_value() {
    let client = FakePlatformClient::new();
    client.set_ci_status(CiStatus::Failing);
    assert_eq!(client.default_branch_ci_status().await, CiStatus::Failing);
}

#[tokio::test]
async fn calls_are_recorded() {
    let client = FakePlatformClient::new();
    client.seed_issue(1, issue_with_labels(1, &[]));
    client.comment(Entity::Issue, 1, "hello").await;
    client.close(Entity::Issue, 1).await;

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], PlatformCall::Comment { .. }));
    assert!(matches!(calls[1], PlatformCall::Close { .. }));
}
