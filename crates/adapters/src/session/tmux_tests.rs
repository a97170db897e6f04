// SPDX-License-Identifier: MIT

use super::*;
use serial_test::serial;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;

static TEST_PREFIX: LazyLock<String> = LazyLock::new(|| {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    format!("lt{:04x}", nanos & 0xFFFF)
});

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_name(suffix: &str) -> String {
    let id = SESSION_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", *TEST_PREFIX, suffix, id)
}

fn tmux_available() -> bool {
    std::process::Command::new("tmux")
        .arg("-V")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

macro_rules! fail_if_no_tmux {
    () => {
        if !tmux_available() {
            eprintln!("skipping: tmux not available");
            return;
        }
    };
}

#[tokio::test]
#[serial(tmux)]
async fn spawn_then_exists_reports_alive_session() {
    fail_if_no_tmux!();
    let adapter = TmuxSessionAdapter::new();
    let name = unique_name("spawn");

    adapter
        .spawn(&name, Path::new("/tmp"), "sleep 60", &[])
        .await
        .unwrap();
    assert!(adapter.exists(&name).await);

    adapter.kill(&name).await;
    assert!(!adapter.exists(&name).await);
}

#[tokio::test]
#[serial(tmux)]
async fn spawn_rejects_missing_cwd() {
    fail_if_no_tmux!();
    let adapter = TmuxSessionAdapter::new();
    let name = unique_name("badcwd");
    let err = adapter
        .spawn(&name, Path::new("/no/such/directory"), "true", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::SpawnFailed(_)));
}

#[tokio::test]
#[serial(tmux)]
async fn spawn_recreates_a_stale_session_of_the_same_name() {
    fail_if_no_tmux!();
    let adapter = TmuxSessionAdapter::new();
    let name = unique_name("recreate");

    adapter
        .spawn(&name, Path::new("/tmp"), "sleep 60", &[])
        .await
        .unwrap();
    assert!(adapter.exists(&name).await);

    adapter
        .spawn(&name, Path::new("/tmp"), "sleep 60", &[])
        .await
        .unwrap();
    assert!(adapter.exists(&name).await);

    adapter.kill(&name).await;
}

#[tokio::test]
#[serial(tmux)]
async fn exists_is_false_for_unknown_session() {
    fail_if_no_tmux!();
    let adapter = TmuxSessionAdapter::new();
    assert!(!adapter.exists(&unique_name("ghost")).await);
}

#[tokio::test]
#[serial(tmux)]
async fn get_session_age_is_negative_one_for_unknown_session() {
    fail_if_no_tmux!();
    let adapter = TmuxSessionAdapter::new();
    assert_eq!(adapter.get_session_age(&unique_name("ghost")).await, -1);
}

#[tokio::test]
#[serial(tmux)]
async fn capture_pane_on_unknown_session_is_empty() {
    fail_if_no_tmux!();
    let adapter = TmuxSessionAdapter::new();
    assert_eq!(adapter.capture_pane(&unique_name("ghost")).await, "");
}

#[tokio::test]
#[serial(tmux)]
async fn send_keys_and_capture_pane_round_trip() {
    fail_if_no_tmux!();
    let adapter = TmuxSessionAdapter::new();
    let name = unique_name("echo");

    adapter
        .spawn(&name, Path::new("/tmp"), "bash", &[])
        .await
        .unwrap();
    adapter
        .send_keys(&name, "echo hello-loom", &["Enter"])
        .await
        .unwrap();

    // Give the shell a beat to render before we capture.
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    let pane = adapter.capture_pane(&name).await;
    assert!(pane.contains("hello-loom"));

    adapter.kill(&name).await;
}
