//! Behavioral specs for `loom-worktree`, grounded on the documented
//! contract in `original_source/loom-tools/tests/test_worktree.py` (the
//! implementation module itself was filtered out of the retrieved source).

use crate::prelude::TestRepo;

#[test]
fn no_args_prints_usage_and_exits_zero() {
    let repo = TestRepo::new();
    let output = repo.bin("loom-worktree").output().expect("run");
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.to_lowercase().contains("usage") || text.to_lowercase().contains("loom-worktree"));
}

#[test]
fn non_numeric_issue_fails_with_must_be_numeric_message() {
    let repo = TestRepo::new();
    let output = repo.bin("loom-worktree").arg("not-a-number").output().expect("run");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr).to_lowercase();
    assert!(stderr.contains("must be numeric") || stderr.contains("error"));
}

#[test]
fn non_numeric_issue_json_reports_failure_object() {
    let repo = TestRepo::new();
    let output = repo.bin("loom-worktree").args(["--json", "not-a-number"]).output().expect("run");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["success"], false);
    assert!(value["error"].is_string());
}

#[test]
fn nonexistent_return_to_path_fails() {
    let repo = TestRepo::new();
    let output = repo
        .bin("loom-worktree")
        .args(["--return-to", "/nonexistent/path/for/loom/tests", "42"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr).to_lowercase();
    assert!(stderr.contains("does not exist") || stderr.contains("error"));
}

#[test]
fn check_outside_a_worktree_reports_not_in_one() {
    let repo = TestRepo::new();
    let output = repo.bin("loom-worktree").arg("--check").output().expect("run");
    let text = String::from_utf8_lossy(&output.stdout).to_lowercase();
    assert!(output.status.code() == Some(1) || text.contains("not"));
}

#[test]
fn creating_a_worktree_for_an_issue_is_idempotent() {
    let repo = TestRepo::new();

    // The fixture repo has no commits; git requires at least one to branch
    // a worktree from, so create one.
    std::fs::write(repo.path().join("README.md"), "init\n").expect("write");
    std::process::Command::new("git")
        .args(["add", "."])
        .current_dir(repo.path())
        .status()
        .expect("git add");
    std::process::Command::new("git")
        .args(["commit", "-m", "init"])
        .current_dir(repo.path())
        .status()
        .expect("git commit");

    let first = repo.bin("loom-worktree").args(["--json", "42"]).output().expect("run");
    assert!(first.status.success(), "stderr: {}", String::from_utf8_lossy(&first.stderr));
    let first_value: serde_json::Value = serde_json::from_slice(&first.stdout).expect("valid json");
    assert_eq!(first_value["success"], true);
    assert_eq!(first_value["issueNumber"], 42);

    let second = repo.bin("loom-worktree").args(["--json", "42"]).output().expect("run");
    assert!(second.status.success());
    let second_value: serde_json::Value = serde_json::from_slice(&second.stdout).expect("valid json");
    assert_eq!(second_value["worktreePath"], first_value["worktreePath"]);
}
