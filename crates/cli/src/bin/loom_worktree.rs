// SPDX-License-Identifier: MIT

//! `loom-worktree` — create (or report on) the isolated git worktree a
//! shepherd builds an issue in, and detect whether the caller is currently
//! standing inside one.
//!
//! `original_source/` filtered out the implementation module itself
//! (`loom_tools.worktree`), keeping only `tests/test_worktree.py`; this
//! binary is reconstructed from that test's documented contract: a
//! `WorktreeResult{success, worktreePath, branchName, issueNumber,
//! returnTo, error}` JSON shape, a numeric positional issue argument,
//! `--return-to`/`--json`/`--check` flags, and the specific error strings
//! the tests assert on ("must be numeric", "does not exist").

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, Stdio};

use clap::Parser;
use loom_cli::{print_json, resolve_repo_root, EXIT_FAILURE, EXIT_OK};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(
    name = "loom-worktree",
    version,
    about = "Create or inspect the isolated git worktree for a shepherd's issue"
)]
struct Cli {
    /// Issue number to create/look up a worktree for.
    issue: Option<String>,

    /// Path to return to after the caller is done with the worktree; must
    /// already exist.
    #[arg(long = "return-to")]
    return_to: Option<String>,

    /// Emit a `WorktreeResult` as JSON on stdout instead of plain text.
    #[arg(long)]
    json: bool,

    /// Report whether the current directory is inside a linked worktree,
    /// rather than creating one.
    #[arg(long)]
    check: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorktreeResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    worktree_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issue_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl WorktreeResult {
    fn ok(worktree_path: PathBuf, branch_name: String, issue_number: u64, return_to: Option<String>) -> Self {
        Self {
            success: true,
            worktree_path: Some(worktree_path.to_string_lossy().into_owned()),
            branch_name: Some(branch_name),
            issue_number: Some(issue_number),
            return_to,
            ..Default::default()
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self { success: false, error: Some(message.into()), ..Default::default() }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.issue.is_none() && !cli.check {
        print_usage();
        return EXIT_OK;
    }

    if let Some(return_to) = &cli.return_to {
        if !Path::new(return_to).exists() {
            return fail(cli.json, format!("return-to path does not exist: {return_to}"));
        }
    }

    if cli.check {
        return run_check(cli.json);
    }

    let issue_raw = cli.issue.as_deref().unwrap_or_default();
    let issue_number: u64 = match issue_raw.trim_start_matches('#').parse() {
        Ok(n) => n,
        Err(_) => return fail(cli.json, format!("issue number must be numeric: {issue_raw:?}")),
    };

    let Some(repo_root) = resolve_repo_root() else {
        return fail(cli.json, "could not resolve repository root");
    };

    match create_or_reuse_worktree(&repo_root, issue_number) {
        Ok((path, branch)) => {
            let result = WorktreeResult::ok(path.clone(), branch, issue_number, cli.return_to.clone());
            if cli.json {
                print_json(&result);
            } else {
                println!("{}", path.display());
            }
            EXIT_OK
        }
        Err(message) => fail(cli.json, message),
    }
}

fn fail(json: bool, message: impl Into<String>) -> ExitCode {
    let message = message.into();
    if json {
        print_json(&WorktreeResult::err(message));
    } else {
        eprintln!("error: {message}");
    }
    EXIT_FAILURE
}

fn print_usage() {
    println!("Usage: loom-worktree [--return-to <path>] [--json] [--check] <issue>");
}

fn worktree_dir(repo_root: &Path, issue_number: u64) -> PathBuf {
    repo_root.join(".loom").join("worktrees").join(format!("issue-{issue_number}"))
}

fn branch_name(issue_number: u64) -> String {
    format!("loom/issue-{issue_number}")
}

/// Create the worktree if it doesn't already exist, or report the existing
/// one (idempotent, since a shepherd may be restarted against the same
/// issue after a crash).
fn create_or_reuse_worktree(repo_root: &Path, issue_number: u64) -> Result<(PathBuf, String), String> {
    let path = worktree_dir(repo_root, issue_number);
    let branch = branch_name(issue_number);

    if path.is_dir() {
        return Ok((path, branch));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("failed to create worktree parent directory: {e}"))?;
    }

    let output = run_git(repo_root, &["worktree", "add", "-B", &branch, &path.to_string_lossy()])?;
    if !output.status.success() {
        // Branch may already exist from a prior attempt; retry without -B.
        let retry = run_git(repo_root, &["worktree", "add", &path.to_string_lossy(), &branch])?;
        if !retry.status.success() {
            return Err(format!("git worktree add failed: {}", String::from_utf8_lossy(&retry.stderr).trim()));
        }
    }

    Ok((path, branch))
}

fn run_git(repo_root: &Path, args: &[&str]) -> Result<std::process::Output, String> {
    Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| format!("failed to spawn git: {e}"))
}

/// `--check`: is the current directory a linked worktree (not the main
/// checkout)? A linked worktree's `.git` is a file pointing elsewhere, so
/// `git rev-parse --git-dir` and `--git-common-dir` diverge.
fn run_check(json: bool) -> ExitCode {
    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => return fail(json, format!("could not determine current directory: {e}")),
    };

    let git_dir = match git_rev_parse(&cwd, "--git-dir") {
        Some(v) => v,
        None => return report_not_in_worktree(json),
    };
    let common_dir = match git_rev_parse(&cwd, "--git-common-dir") {
        Some(v) => v,
        None => return report_not_in_worktree(json),
    };

    if git_dir == common_dir {
        return report_not_in_worktree(json);
    }

    if json {
        print_json(&WorktreeResult { success: true, worktree_path: Some(cwd.to_string_lossy().into_owned()), ..Default::default() });
    } else {
        println!("in worktree: {}", cwd.display());
    }
    EXIT_OK
}

fn report_not_in_worktree(json: bool) -> ExitCode {
    if json {
        print_json(&WorktreeResult::err("not currently inside a git worktree"));
    } else {
        println!("not currently inside a git worktree");
    }
    EXIT_FAILURE
}

fn git_rev_parse(dir: &Path, arg: &str) -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", arg])
        .current_dir(dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
