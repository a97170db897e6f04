//! Shared black-box test helpers: spin up a minimal git+`.loom` repository
//! and run the workspace's standalone binaries against it with
//! `assert_cmd`, grounded on the teacher's `tests/specs/prelude.rs`.
//!
//! The binaries under test (`loom-baseline-health`, `loom-worktree`) live
//! in the `loom-cli` member crate, not in this root `loom-specs` test
//! package, so `assert_cmd::Command::cargo_bin`'s `CARGO_BIN_EXE_<name>`
//! lookup (which only covers binaries of the *same* package) can't find
//! them. Resolve `target/<profile>/<name>` directly instead, the same
//! `binary_path` idiom the teacher's prelude uses for its own `oj`/`ojd`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;

/// Resolves a workspace binary's path under `target/debug/`, falling back
/// to locating it relative to this test binary's own path when
/// `CARGO_MANIFEST_DIR` points at a stale or relocated checkout.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

/// A throwaway repository with a real `.git` (so [`loom_storage::find_repo_root`]
/// accepts it) and an empty `.loom/` state directory.
pub struct TestRepo {
    dir: tempfile::TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        run_git(dir.path(), &["init", "--quiet"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test"]);
        std::fs::create_dir_all(dir.path().join(".loom")).expect("create .loom");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// An `assert_cmd::Command` for one of the workspace's own binaries,
    /// already pointed at this repository's root.
    pub fn bin(&self, name: &str) -> Command {
        let mut cmd = Command::new(binary_path(name));
        cmd.current_dir(self.path());
        cmd
    }
}

fn run_git(dir: &Path, args: &[&str]) {
    let status = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("git should be on PATH");
    assert!(status.success(), "git {args:?} failed");
}
