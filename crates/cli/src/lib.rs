// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Shared helpers for the standalone Loom CLI binaries (`loom-baseline-health`,
//! `loom-worktree`), grounded on `loom_tools/baseline_health_cli.py` and
//! `loom_tools/worktree`'s CLI surface (per `tests/test_worktree.py` in
//! `original_source/`, the implementation module itself was filtered out of
//! the retrieved source and is reconstructed from its test contract here).
//!
//! Both binaries are thin, synchronous command-line tools in the spirit of
//! §1's "CLI wrappers for state inspection" — unlike `loom-daemon`, they do
//! not run a tick loop and have no need of `tokio`.

use std::process::ExitCode;

/// Print a `serde_json::Serialize` value to stdout as pretty JSON followed
/// by a trailing newline, matching the two-space-indent/trailing-newline
/// convention spec §6 fixes for every on-disk file (applied here to stdout
/// output for consistency).
pub fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("error: failed to serialize JSON output: {e}"),
    }
}

/// Resolve the repository root via [`loom_storage::find_repo_root`],
/// printing a plain `error: ...` line to stderr and returning `None` on
/// failure so callers can map it to the CLI's documented exit code.
pub fn resolve_repo_root() -> Option<std::path::PathBuf> {
    match loom_storage::find_repo_root(None) {
        Ok(root) => Some(root),
        Err(e) => {
            eprintln!("error: {e}");
            None
        }
    }
}

pub const EXIT_OK: ExitCode = ExitCode::SUCCESS;
pub const EXIT_FAILURE: ExitCode = ExitCode::FAILURE;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Sample {
        ok: bool,
    }

    #[test]
    fn print_json_does_not_panic_on_serializable_value() {
        print_json(&Sample { ok: true });
    }
}
