//! Behavioral specs for `loom-baseline-health`, grounded on
//! `original_source/loom-tools/src/loom_tools/baseline_health_cli.py`.

use crate::prelude::TestRepo;

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn report_then_check_round_trips_healthy_status() {
    let repo = TestRepo::new();

    repo.bin("loom-baseline-health").args(["report", "--status", "healthy"]).assert().success();

    repo.bin("loom-baseline-health").args(["check"]).assert().code(0);
}

#[test]
fn report_failing_makes_check_exit_one() {
    let repo = TestRepo::new();

    let output = repo
        .bin("loom-baseline-health")
        .args(["report", "--status", "failing", "--test", "test_widgets", "--issue", "#2042"])
        .output()
        .expect("run");
    assert!(output.status.success());
    assert!(stderr_of(&output).contains("Baseline health: failing"));

    repo.bin("loom-baseline-health").args(["check"]).assert().code(1);
}

#[test]
fn check_with_no_prior_report_is_unknown() {
    let repo = TestRepo::new();
    repo.bin("loom-baseline-health").args(["check"]).assert().code(2);
}

#[test]
fn check_is_stale_past_ttl() {
    let repo = TestRepo::new();

    repo.bin("loom-baseline-health")
        .args(["report", "--status", "healthy", "--ttl", "0"])
        .assert()
        .success();

    // A zero-minute TTL means the reading is immediately stale.
    repo.bin("loom-baseline-health").args(["check"]).assert().code(2);
}

#[test]
fn show_reports_tracked_issue_and_failing_tests() {
    let repo = TestRepo::new();

    repo.bin("loom-baseline-health")
        .args(["report", "--status", "failing", "--test", "test_a", "--test", "test_b", "--issue", "#7"])
        .assert()
        .success();

    let output = repo.bin("loom-baseline-health").args(["show"]).output().expect("run");
    assert!(output.status.success());
    let text = stdout_of(&output);
    assert!(text.contains("Status: failing"));
    assert!(text.contains("test_a"));
    assert!(text.contains("test_b"));
    assert!(text.contains("Tracking: #7"));
}

#[test]
fn show_json_round_trips_through_state_store() {
    let repo = TestRepo::new();

    repo.bin("loom-baseline-health").args(["report", "--status", "healthy"]).assert().success();

    let output = repo.bin("loom-baseline-health").args(["show", "--json"]).output().expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["status"], "healthy");
}
