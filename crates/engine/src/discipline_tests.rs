use super::*;
use loom_core::DaemonState;
use std::fs;

fn store(dir: &std::path::Path) -> StateStore {
    StateStore::new(LoomPaths::new(dir))
}

#[test]
fn acquire_pid_file_detects_live_process_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LoomPaths::new(dir.path());
    fs::create_dir_all(paths.state_dir()).unwrap();
    // PID 1 (init) is always alive on a Linux test host.
    fs::write(paths.pid_file(), "1").unwrap();

    let discipline = Discipline::new(paths, "session-a");
    let err = discipline.acquire_pid_file().unwrap_err();
    assert_eq!(err, DisciplineError::SessionConflict(1));
}

#[test]
fn acquire_pid_file_replaces_stale_dead_pid() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LoomPaths::new(dir.path());
    fs::create_dir_all(paths.state_dir()).unwrap();
    // A pid extremely unlikely to be alive.
    fs::write(paths.pid_file(), "999999999").unwrap();

    let discipline = Discipline::new(paths.clone(), "session-a");
    discipline.acquire_pid_file().unwrap();
    let written = fs::read_to_string(paths.pid_file()).unwrap();
    assert_eq!(written.trim(), std::process::id().to_string());
}

#[test]
fn malformed_pid_file_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LoomPaths::new(dir.path());
    fs::create_dir_all(paths.state_dir()).unwrap();
    fs::write(paths.pid_file(), "not-a-pid").unwrap();

    let discipline = Discipline::new(paths.clone(), "session-a");
    discipline.acquire_pid_file().unwrap();
    assert!(paths.pid_file().exists());
}

#[test]
fn stop_signal_present_reflects_file_existence() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LoomPaths::new(dir.path());
    fs::create_dir_all(paths.state_dir()).unwrap();
    let discipline = Discipline::new(paths.clone(), "session-a");
    assert!(!discipline.stop_signal_present());
    fs::write(paths.stop_signal_file(), "").unwrap();
    assert!(discipline.stop_signal_present());
    discipline.remove_stop_signal();
    assert!(!discipline.stop_signal_present());
}

#[test]
fn session_superseded_detects_mismatched_id() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LoomPaths::new(dir.path());
    let st = store(dir.path());
    st.write_daemon_state(&DaemonState::new_session("other-session")).unwrap();

    let discipline = Discipline::new(paths, "my-session");
    assert!(discipline.session_superseded(&st));
}

#[test]
fn session_not_superseded_when_ids_match_or_unset() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LoomPaths::new(dir.path());
    let st = store(dir.path());

    let discipline = Discipline::new(paths.clone(), "my-session");
    // No state written yet: default daemon_session_id is empty, never a conflict.
    assert!(!discipline.session_superseded(&st));

    st.write_daemon_state(&DaemonState::new_session("my-session")).unwrap();
    assert!(!discipline.session_superseded(&st));
}

#[test]
fn drain_signals_consumes_files_in_sorted_order_and_deletes_them() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LoomPaths::new(dir.path());
    let st = store(dir.path());
    fs::create_dir_all(paths.signals_dir()).unwrap();
    fs::write(
        paths.signals_dir().join("0001.json"),
        r#"{"command":"start_orchestration"}"#,
    )
    .unwrap();
    fs::write(
        paths.signals_dir().join("0002.json"),
        r#"{"command":"spawn_shepherd","issue":42,"mode":"force","flags":["--x"]}"#,
    )
    .unwrap();

    let discipline = Discipline::new(paths.clone(), "s");
    let commands = discipline.drain_signals(&st);
    assert_eq!(
        commands,
        vec![
            InboundCommand::StartOrchestration,
            InboundCommand::SpawnShepherd {
                issue: 42,
                mode: Some("force".to_string()),
                flags: vec!["--x".to_string()],
            },
        ]
    );
    assert!(st.list_signal_files().is_empty());
}

#[test]
fn default_session_id_embeds_pid() {
    let id = Discipline::default_session_id(100);
    assert!(id.starts_with("100-"));
    assert!(id.ends_with(&std::process::id().to_string()));
}
