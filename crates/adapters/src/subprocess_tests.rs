// SPDX-License-Identifier: MIT

use super::*;

#[tokio::test]
async fn run_with_timeout_returns_output_on_success() {
    let mut cmd = Command::new("echo");
    cmd.arg("hi");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo").await.unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hi");
}

#[tokio::test]
async fn run_with_timeout_reports_timeout() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    let err = run_with_timeout(cmd, Duration::from_millis(50), "sleep")
        .await
        .unwrap_err();
    assert!(err.contains("timed out"));
}

#[tokio::test]
async fn run_with_timeout_reports_spawn_failure() {
    let cmd = Command::new("/nonexistent/binary-that-does-not-exist");
    let err = run_with_timeout(cmd, Duration::from_secs(5), "missing")
        .await
        .unwrap_err();
    assert!(err.contains("missing failed"));
}
