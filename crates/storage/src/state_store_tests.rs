use super::*;
use loom_core::{DaemonState, ShepherdEntry};
use tempfile::tempdir;

fn store_in(dir: &Path) -> StateStore {
    StateStore::new(LoomPaths::new(dir))
}

#[test]
fn missing_daemon_state_reads_as_default() {
    let dir = tempdir().unwrap();
    let store = store_in(dir.path());
    assert_eq!(store.read_daemon_state(), DaemonState::default());
}

#[test]
fn daemon_state_round_trips() {
    let dir = tempdir().unwrap();
    let store = store_in(dir.path());
    let mut state = DaemonState::new_session("100-5");
    state.shepherds.insert(
        "shepherd-1".into(),
        ShepherdEntry {
            issue: Some(42),
            ..Default::default()
        },
    );
    store.write_daemon_state(&state).unwrap();
    assert_eq!(store.read_daemon_state(), state);
}

#[test]
fn progress_round_trips_and_lists() {
    let dir = tempdir().unwrap();
    let store = store_in(dir.path());
    let progress = loom_core::ShepherdProgress::new("task-1", Some(7));
    store.write_progress(&progress).unwrap();

    let read_back = store.read_progress("task-1");
    assert_eq!(read_back.task_id, "task-1");
    assert_eq!(read_back.issue, Some(7));

    let listed = store.list_progress();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].task_id, "task-1");

    store.delete_progress("task-1");
    assert!(store.list_progress().is_empty());
}

#[test]
fn reading_a_missing_progress_file_still_carries_the_requested_task_id() {
    let dir = tempdir().unwrap();
    let store = store_in(dir.path());
    let progress = store.read_progress("never-written");
    assert_eq!(progress.task_id, "never-written");
}

#[test]
fn signals_are_listed_in_sorted_order_and_consumed_once() {
    let dir = tempdir().unwrap();
    let store = store_in(dir.path());
    std::fs::create_dir_all(store.paths().signals_dir()).unwrap();
    std::fs::write(
        store.paths().signals_dir().join("0002.json"),
        r#"{"command":"stop_orchestration"}"#,
    )
    .unwrap();
    std::fs::write(
        store.paths().signals_dir().join("0001.json"),
        r#"{"command":"start_orchestration"}"#,
    )
    .unwrap();

    let files = store.list_signal_files();
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("0001.json"));
    assert!(files[1].ends_with("0002.json"));

    let payload = store.read_signal(&files[0]).unwrap();
    assert_eq!(payload["command"], "start_orchestration");

    store.consume_signal(&files[0]);
    assert_eq!(store.list_signal_files().len(), 1);
}
