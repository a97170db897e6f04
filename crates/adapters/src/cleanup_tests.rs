// SPDX-License-Identifier: MIT

use super::*;

#[tokio::test]
async fn fake_cleanup_records_notified_issues() {
    let cleanup = FakeCompletionCleanup::new();
    cleanup.shepherd_complete(42).await;
    cleanup.shepherd_complete(7).await;
    assert_eq!(cleanup.notified_issues(), vec![42, 7]);
}

#[tokio::test]
async fn process_cleanup_is_a_no_op_when_binary_cannot_be_resolved() {
    let dir = tempfile::tempdir().unwrap();
    let cleanup = ProcessCompletionCleanup::new(dir.path());
    // No venv-local binary and (almost certainly) nothing named
    // `loom-daemon-cleanup` on PATH in a test environment: this must not
    // panic or block, per the "best-effort" contract.
    cleanup.shepherd_complete(1).await;
}
