// SPDX-License-Identifier: MIT

//! `gh` (GitHub CLI) backed platform client, grounded 1:1 on
//! `loom_tools/common/github.py`.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;

use super::{CiStatus, Entity, ListParams, PlatformClient};
use crate::subprocess::{run_with_timeout, GH_TIMEOUT};

const MAX_PARALLEL_QUERIES: usize = 4;
const DEFAULT_BRANCH_FOR_CI: &str = "main";
const CI_RUN_LIMIT: u32 = 5;

/// Extra fields `gh pr {list,view}` must carry so [`decorate_pr_json`] can
/// derive `linked_issue` and `review_cycles` (spec §3: both marked
/// "derived"). Unioned into whatever fields a caller already asked for,
/// only for [`Entity::Pr`] queries — issues never get these.
const PR_DERIVATION_FIELDS: [&str; 4] = ["body", "headRefName", "reviews", "commits"];

fn fields_for(entity: Entity, requested: &[&str]) -> Vec<String> {
    let mut fields: Vec<String> = requested.iter().map(|f| f.to_string()).collect();
    if entity == Entity::Pr {
        for extra in PR_DERIVATION_FIELDS {
            if !fields.iter().any(|f| f == extra) {
                fields.push(extra.to_string());
            }
        }
    }
    fields
}

/// Prefers the `gh-cached` wrapper binary when present on `PATH`, falling
/// back to the real `gh`, per `github.py::_gh_cmd`.
fn gh_binary() -> &'static str {
    if which::which("gh-cached").is_ok() {
        "gh-cached"
    } else {
        "gh"
    }
}

async fn gh_run(args: &[String]) -> Result<std::process::Output, String> {
    let mut cmd = Command::new(gh_binary());
    cmd.args(args);
    run_with_timeout(cmd, GH_TIMEOUT, "gh").await
}

/// Parses stdout as JSON on success, folding any failure (non-zero exit,
/// I/O error, malformed JSON) into `default`, per
/// `common/state.py::parse_command_output`.
fn parse_json_or<T: Default>(
    output: Result<std::process::Output, String>,
    parse: impl FnOnce(serde_json::Value) -> Option<T>,
) -> T {
    let Ok(output) = output else {
        return T::default();
    };
    if !output.status.success() {
        return T::default();
    }
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(&output.stdout) else {
        return T::default();
    };
    parse(value).unwrap_or_default()
}

fn list_args(entity: Entity, params: &ListParams<'_>) -> Vec<String> {
    let default_fields = ["number", "title", "labels", "state"];
    let fields: Vec<&str> = if params.fields.is_empty() {
        default_fields.to_vec()
    } else {
        params.fields.iter().map(String::as_str).collect()
    };
    let fields = fields_for(entity, &fields);

    let mut args = vec![
        entity.as_str().to_string(),
        "list".to_string(),
        "--json".to_string(),
        fields.join(","),
        "--state".to_string(),
        params.state.to_string(),
    ];
    if !params.labels.is_empty() {
        args.push("--label".to_string());
        args.push(params.labels.join(","));
    }
    if let Some(search) = params.search {
        args.push("--search".to_string());
        args.push(search.to_string());
    }
    if let Some(head) = params.head {
        args.push("--head".to_string());
        args.push(head.to_string());
    }
    if let Some(limit) = params.limit {
        args.push("--limit".to_string());
        args.push(limit.to_string());
    }
    args
}

/// Thin wrapper around the `gh` CLI, grounded on `github.py`.
#[derive(Debug, Clone, Default)]
pub struct GhPlatformClient;

impl GhPlatformClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PlatformClient for GhPlatformClient {
    async fn list(&self, entity: Entity, params: ListParams<'_>) -> Vec<serde_json::Value> {
        let args = list_args(entity, &params);
        let output = gh_run(&args).await;
        let items: Vec<serde_json::Value> = parse_json_or(output, |v| v.as_array().cloned());
        if entity == Entity::Pr {
            items.into_iter().map(decorate_pr_json).collect()
        } else {
            items
        }
    }

    async fn view(&self, entity: Entity, number: u64, fields: &[String]) -> Option<serde_json::Value> {
        let default_fields = ["number", "title", "labels", "state", "body"];
        let requested: Vec<&str> = if fields.is_empty() {
            default_fields.to_vec()
        } else {
            fields.iter().map(String::as_str).collect()
        };
        let field_list = fields_for(entity, &requested).join(",");
        let args = vec![
            entity.as_str().to_string(),
            "view".to_string(),
            number.to_string(),
            "--json".to_string(),
            field_list,
        ];
        let output = gh_run(&args).await;
        let Ok(output) = output else { return None };
        if !output.status.success() {
            return None;
        }
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).ok()?;
        Some(if entity == Entity::Pr { decorate_pr_json(value) } else { value })
    }

    async fn edit_labels(&self, entity: Entity, number: u64, add: &[String], remove: &[String]) -> bool {
        let mut args = vec![
            entity.as_str().to_string(),
            "edit".to_string(),
            number.to_string(),
        ];
        for label in add {
            args.push("--add-label".to_string());
            args.push(label.clone());
        }
        for label in remove {
            args.push("--remove-label".to_string());
            args.push(label.clone());
        }
        if add.is_empty() && remove.is_empty() {
            return true;
        }
        gh_run(&args)
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn comment(&self, entity: Entity, number: u64, body: &str) -> bool {
        let args = vec![
            entity.as_str().to_string(),
            "comment".to_string(),
            number.to_string(),
            "--body".to_string(),
            body.to_string(),
        ];
        gh_run(&args)
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn close(&self, entity: Entity, number: u64) -> bool {
        let args = vec![entity.as_str().to_string(), "close".to_string(), number.to_string()];
        gh_run(&args)
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn merge_pr(&self, number: u64, cleanup: bool) -> bool {
        let mut args = vec!["pr".to_string(), "merge".to_string(), number.to_string(), "--squash".to_string()];
        if cleanup {
            args.push("--delete-branch".to_string());
        }
        gh_run(&args)
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn list_many(&self, queries: Vec<(Entity, ListParams<'_>)>) -> Vec<Vec<serde_json::Value>> {
        let semaphore = Arc::new(Semaphore::new(MAX_PARALLEL_QUERIES));
        let tasks = queries.into_iter().map(|(entity, params)| {
            let args = list_args(entity, &params);
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore never closed");
                let output = gh_run(&args).await;
                let items: Vec<serde_json::Value> = parse_json_or(output, |v| v.as_array().cloned());
                if entity == Entity::Pr {
                    items.into_iter().map(decorate_pr_json).collect()
                } else {
                    items
                }
            }
        });
        join_all(tasks).await
    }

    async fn default_branch_ci_status(&self) -> CiStatus {
        let args = vec![
            "run".to_string(),
            "list".to_string(),
            "--branch".to_string(),
            DEFAULT_BRANCH_FOR_CI.to_string(),
            "--limit".to_string(),
            CI_RUN_LIMIT.to_string(),
            "--json".to_string(),
            "name,conclusion,status,headBranch".to_string(),
        ];
        let output = gh_run(&args).await;
        let runs: Vec<serde_json::Value> = parse_json_or(output, |v| v.as_array().cloned());
        classify_ci_runs(&runs)
    }
}

/// Folds the `body`/`headRefName`/`reviews`/`commits` fields `gh pr` carries
/// into the `linked_issue`/`review_cycles` keys `loom_core::issue::Pr`
/// expects. Grounded on spec §3's "derived" annotation on both fields:
/// neither is ever present in `gh`'s own output, so every PR-entity response
/// is decorated here before the snapshot builder ever parses it.
fn decorate_pr_json(mut value: serde_json::Value) -> serde_json::Value {
    let Some(obj) = value.as_object_mut() else {
        return value;
    };

    let body = obj.get("body").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let head_branch = obj.get("headRefName").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let linked_issue = loom_core::issue::derive_linked_issue(&body, &head_branch);
    let review_cycles = derive_review_cycles_from_json(obj.get("reviews"), obj.get("commits"));

    if let Some(n) = linked_issue {
        obj.insert("linked_issue".to_string(), serde_json::json!(n));
    }
    obj.insert("review_cycles".to_string(), serde_json::json!(review_cycles));
    value
}

/// Counts `changes-requested -> commit pushed` cycles by walking a PR's
/// reviews and commits in timestamp order and comparing RFC3339 `Z`-suffixed
/// timestamps lexicographically (they sort correctly as strings, so no
/// time-parsing dependency is needed). Each `CHANGES_REQUESTED` review
/// followed by a later commit counts one cycle; a review is only "followed"
/// by the earliest commit after it, so a burst of commits after one request
/// counts once.
fn derive_review_cycles_from_json(reviews: Option<&serde_json::Value>, commits: Option<&serde_json::Value>) -> u32 {
    let request_times: Vec<&str> = reviews
        .and_then(|v| v.as_array())
        .map(|reviews| {
            reviews
                .iter()
                .filter(|r| r.get("state").and_then(|s| s.as_str()) == Some("CHANGES_REQUESTED"))
                .filter_map(|r| r.get("submittedAt").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();
    if request_times.is_empty() {
        return 0;
    }

    let commit_times: Vec<&str> = commits
        .and_then(|v| v.as_array())
        .map(|commits| {
            commits
                .iter()
                .filter_map(|c| {
                    c.get("committedDate")
                        .or_else(|| c.get("commit").and_then(|inner| inner.get("committedDate")))
                        .and_then(|t| t.as_str())
                })
                .collect()
        })
        .unwrap_or_default();

    let mut cycles = 0u32;
    for requested_at in request_times {
        if commit_times.iter().any(|&pushed_at| pushed_at > requested_at) {
            cycles += 1;
        }
    }
    cycles
}

/// Groups runs by workflow name, keeping only the most recent (first-seen)
/// run per name, and fails the batch if any *completed* run's conclusion is
/// `failure`. `unknown` when no runs were returned at all, per
/// `github.py::gh_get_default_branch_ci_status`.
fn classify_ci_runs(runs: &[serde_json::Value]) -> CiStatus {
    if runs.is_empty() {
        return CiStatus::Unknown;
    }

    let mut seen_names = std::collections::HashSet::new();
    let mut any_failed = false;
    for run in runs {
        let name = run.get("name").and_then(|v| v.as_str()).unwrap_or("Unknown");
        if !seen_names.insert(name.to_string()) {
            continue;
        }
        let status = run.get("status").and_then(|v| v.as_str()).unwrap_or("");
        let conclusion = run.get("conclusion").and_then(|v| v.as_str()).unwrap_or("");
        if status == "completed" && conclusion == "failure" {
            any_failed = true;
        }
    }

    if any_failed {
        CiStatus::Failing
    } else {
        CiStatus::Passing
    }
}

#[cfg(test)]
#[path = "gh_tests.rs"]
mod tests;
