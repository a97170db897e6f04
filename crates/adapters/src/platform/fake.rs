// SPDX-License-Identifier: MIT

//! In-memory fake [`PlatformClient`] for engine/daemon tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::{CiStatus, Entity, ListParams, PlatformClient};

#[derive(Debug, Clone)]
pub enum PlatformCall {
    EditLabels { entity: Entity, number: u64, add: Vec<String>, remove: Vec<String> },
    Comment { entity: Entity, number: u64, body: String },
    Close { entity: Entity, number: u64 },
    MergePr { number: u64, cleanup: bool },
}

struct FakePlatformState {
    issues: HashMap<u64, serde_json::Value>,
    prs: HashMap<u64, serde_json::Value>,
    ci_status: CiStatus,
    calls: Vec<PlatformCall>,
}

/// Test double that serves pre-seeded issue/PR JSON and records every
/// mutating call, grounded on the interior-mutability pattern used by
/// [`crate::session::FakeSessionAdapter`].
#[derive(Clone)]
pub struct FakePlatformClient {
    inner: Arc<Mutex<FakePlatformState>>,
}

impl Default for FakePlatformClient {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakePlatformState {
                issues: HashMap::new(),
                prs: HashMap::new(),
                ci_status: CiStatus::Passing,
                calls: Vec::new(),
            })),
        }
    }
}

impl FakePlatformClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_issue(&self, number: u64, value: serde_json::Value) {
        self.inner.lock().issues.insert(number, value);
    }

    pub fn seed_pr(&self, number: u64, value: serde_json::Value) {
        self.inner.lock().prs.insert(number, value);
    }

    pub fn set_ci_status(&self, status: CiStatus) {
        self.inner.lock().ci_status = status;
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.inner.lock().calls.clone()
    }

    fn table(&self, entity: Entity) -> fn(&mut FakePlatformState) -> &mut HashMap<u64, serde_json::Value> {
        match entity {
            Entity::Issue => |s| &mut s.issues,
            Entity::Pr => |s| &mut s.prs,
        }
    }
}

#[async_trait]
impl PlatformClient for FakePlatformClient {
    async fn list(&self, entity: Entity, params: ListParams<'_>) -> Vec<serde_json::Value> {
        let inner = self.inner.lock();
        let table = match entity {
            Entity::Issue => &inner.issues,
            Entity::Pr => &inner.prs,
        };
        let mut matched: Vec<serde_json::Value> = table
            .values()
            .filter(|v| {
                if params.labels.is_empty() {
                    return true;
                }
                let Some(labels) = v.get("labels").and_then(|l| l.as_array()) else {
                    return false;
                };
                params.labels.iter().all(|wanted| {
                    labels.iter().any(|l| {
                        l.get("name").and_then(|n| n.as_str()) == Some(wanted.as_str())
                    })
                })
            })
            .cloned()
            .collect();
        matched.sort_by_key(|v| v.get("number").and_then(|n| n.as_u64()).unwrap_or(0));
        if let Some(limit) = params.limit {
            matched.truncate(limit as usize);
        }
        matched
    }

    async fn view(&self, entity: Entity, number: u64, _fields: &[String]) -> Option<serde_json::Value> {
        let inner = self.inner.lock();
        let table = match entity {
            Entity::Issue => &inner.issues,
            Entity::Pr => &inner.prs,
        };
        table.get(&number).cloned()
    }

    async fn edit_labels(&self, entity: Entity, number: u64, add: &[String], remove: &[String]) -> bool {
        let getter = self.table(entity);
        let mut inner = self.inner.lock();
        inner.calls.push(PlatformCall::EditLabels {
            entity,
            number,
            add: add.to_vec(),
            remove: remove.to_vec(),
        });
        let Some(entry) = getter(&mut inner).get_mut(&number) else {
            return false;
        };
        let mut labels: Vec<String> = entry
            .get("labels")
            .and_then(|l| l.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|l| l.get("name").and_then(|n| n.as_str()).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        labels.retain(|l| !remove.contains(l));
        for label in add {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        entry["labels"] = serde_json::Value::Array(
            labels
                .into_iter()
                .map(|name| serde_json::json!({"name": name}))
                .collect(),
        );
        true
    }

    async fn comment(&self, entity: Entity, number: u64, body: &str) -> bool {
        self.inner.lock().calls.push(PlatformCall::Comment {
            entity,
            number,
            body: body.to_string(),
        });
        true
    }

    async fn close(&self, entity: Entity, number: u64) -> bool {
        let getter = self.table(entity);
        let mut inner = self.inner.lock();
        inner.calls.push(PlatformCall::Close { entity, number });
        if let Some(entry) = getter(&mut inner).get_mut(&number) {
            entry["state"] = serde_json::Value::String("CLOSED".to_string());
            true
        } else {
            false
        }
    }

    async fn merge_pr(&self, number: u64, cleanup: bool) -> bool {
        let mut inner = self.inner.lock();
        inner.calls.push(PlatformCall::MergePr { number, cleanup });
        if let Some(entry) = inner.prs.get_mut(&number) {
            entry["state"] = serde_json::Value::String("MERGED".to_string());
            true
        } else {
            false
        }
    }

    async fn list_many(&self, queries: Vec<(Entity, ListParams<'_>)>) -> Vec<Vec<serde_json::Value>> {
        let mut results = Vec::with_capacity(queries.len());
        for (entity, params) in queries {
            results.push(self.list(entity, params).await);
        }
        results
    }

    async fn default_branch_ci_status(&self) -> CiStatus {
        self.inner.lock().ci_status
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
