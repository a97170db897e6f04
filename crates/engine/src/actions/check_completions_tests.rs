// SPDX-License-Identifier: MIT

use super::*;
use loom_adapters::cleanup::FakeCompletionCleanup;
use loom_core::daemon_state::{ShepherdEntry, ShepherdStatus};
use loom_core::shepherd::{Milestone, ProgressStatus, ShepherdProgress};
use loom_storage::{LoomPaths, StateStore};
use tempfile::TempDir;

fn store() -> (TempDir, StateStore) {
    let dir = TempDir::new().unwrap();
    let store = StateStore::new(LoomPaths::new(dir.path()));
    (dir, store)
}

fn seed_progress(store: &StateStore, task_id: &str, issue: u64, status: ProgressStatus, pr_merged: bool) {
    let mut progress = ShepherdProgress::new(task_id, Some(issue));
    progress.record_milestone(Milestone::Started { epoch_secs: 1 }).unwrap();
    let terminal = match status {
        ProgressStatus::Completed => Milestone::Completed { exit_code: 0, epoch_secs: 42 },
        ProgressStatus::Errored => Milestone::Errored { exit_code: 4, message: "stuck".into(), epoch_secs: 42 },
        ProgressStatus::Running => unreachable!("tests only seed terminal progress"),
    };
    progress.record_milestone(terminal).unwrap();
    progress.pr_merged = pr_merged;
    store.write_progress(&progress).unwrap();
}

#[tokio::test]
async fn resets_matching_slot_and_records_completion() {
    let (_dir, store) = store();
    let cleanup = FakeCompletionCleanup::new();
    let mut state = DaemonState::new_session("s1");
    state.shepherds.insert(
        "shepherd-1".into(),
        ShepherdEntry {
            status: ShepherdStatus::Building,
            task_id: Some("t1".into()),
            issue: Some(42),
            ..Default::default()
        },
    );
    seed_progress(&store, "t1", 42, ProgressStatus::Completed, true);

    let completed = check_completions(&store, &cleanup, &mut state).await;

    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].issue, Some(42));
    assert_eq!(state.shepherds["shepherd-1"].status, ShepherdStatus::Idle);
    assert_eq!(state.shepherds["shepherd-1"].idle_reason.as_deref(), Some("completed_issue"));
    assert_eq!(state.completed_issues, vec![42]);
    assert_eq!(state.total_prs_merged, 1);
    assert_eq!(cleanup.notified_issues(), vec![42]);
    assert!(store.list_progress().is_empty());
}

#[tokio::test]
async fn does_not_increment_merged_count_when_pr_was_not_merged() {
    let (_dir, store) = store();
    let cleanup = FakeCompletionCleanup::new();
    let mut state = DaemonState::new_session("s1");
    state.shepherds.insert(
        "shepherd-1".into(),
        ShepherdEntry {
            status: ShepherdStatus::Building,
            task_id: Some("t1".into()),
            issue: Some(9),
            ..Default::default()
        },
    );
    seed_progress(&store, "t1", 9, ProgressStatus::Completed, false);

    check_completions(&store, &cleanup, &mut state).await;

    assert_eq!(state.total_prs_merged, 0);
}

#[tokio::test]
async fn errored_runs_are_also_reconciled() {
    let (_dir, store) = store();
    let cleanup = FakeCompletionCleanup::new();
    let mut state = DaemonState::new_session("s1");
    state.shepherds.insert(
        "shepherd-1".into(),
        ShepherdEntry {
            status: ShepherdStatus::Building,
            task_id: Some("t1".into()),
            issue: Some(9),
            ..Default::default()
        },
    );
    seed_progress(&store, "t1", 9, ProgressStatus::Errored, false);

    let completed = check_completions(&store, &cleanup, &mut state).await;
    assert_eq!(completed.len(), 1);
    assert_eq!(state.shepherds["shepherd-1"].status, ShepherdStatus::Idle);
}

#[tokio::test]
async fn progress_with_no_matching_slot_is_still_deleted() {
    let (_dir, store) = store();
    let cleanup = FakeCompletionCleanup::new();
    let mut state = DaemonState::new_session("s1");
    seed_progress(&store, "orphan", 1, ProgressStatus::Completed, false);

    let completed = check_completions(&store, &cleanup, &mut state).await;
    assert!(completed.is_empty());
    assert!(cleanup.notified_issues().is_empty());
    assert!(store.list_progress().is_empty());
}

#[tokio::test]
async fn running_progress_is_left_untouched() {
    let (_dir, store) = store();
    let cleanup = FakeCompletionCleanup::new();
    let mut state = DaemonState::new_session("s1");
    let progress = ShepherdProgress::new("t1", Some(1));
    store.write_progress(&progress).unwrap();

    let completed = check_completions(&store, &cleanup, &mut state).await;
    assert!(completed.is_empty());
    assert_eq!(store.list_progress().len(), 1);
}
