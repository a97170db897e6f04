// SPDX-License-Identifier: MIT

//! Per-agent Claude Code config directory isolation, grounded 1:1 on
//! `loom_tools/common/claude_config.py`.
//!
//! Concurrent agents sharing `~/.claude/` fight over session files, lock
//! files, and scratch directories. Each agent instead gets
//! `.loom/claude-config/{agent-name}/`: symlinks to the shared read-only
//! config plus fresh empty directories for mutable per-session state.

use std::io;
use std::path::{Path, PathBuf};

use loom_storage::LoomPaths;

const SHARED_CONFIG_FILES: &[&str] = &["settings.json", "config.json", "mcp.json", ".mcp.json"];
const SHARED_CONFIG_DIRS: &[&str] = &["statsig"];
const MUTABLE_DIRS: &[&str] = &[
    "projects",
    "todos",
    "debug",
    "file-history",
    "session-env",
    "tasks",
    "plans",
    "shell-snapshots",
    "tmp",
];

/// Resolves Claude Code's onboarding-state file: `~/.claude/.config.json`
/// if present, else `~/.claude.json`.
fn resolve_state_file(home: &Path) -> PathBuf {
    let preferred = home.join(".claude").join(".config.json");
    if preferred.exists() {
        preferred
    } else {
        home.join(".claude.json")
    }
}

#[cfg(unix)]
fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(not(unix))]
fn symlink(_src: &Path, _dst: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "agent config isolation requires symlink support",
    ))
}

fn symlink_if_missing(src: &Path, dst: &Path) -> io::Result<()> {
    if src.exists() && !dst.exists() {
        symlink(src, dst)?;
    }
    Ok(())
}

/// Creates an isolated `CLAUDE_CONFIG_DIR` for `agent_name` under
/// `repo_root/.loom/claude-config/`. Idempotent: existing symlinks and
/// directories are left untouched.
pub fn setup_agent_config_dir(agent_name: &str, repo_root: &Path) -> io::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "could not resolve home directory")
    })?;
    setup_agent_config_dir_with_home(agent_name, repo_root, &home)
}

fn setup_agent_config_dir_with_home(
    agent_name: &str,
    repo_root: &Path,
    home: &Path,
) -> io::Result<PathBuf> {
    let paths = LoomPaths::new(repo_root);
    let config_dir = paths.agent_claude_config_dir(agent_name);
    std::fs::create_dir_all(&config_dir)?;

    let home_claude = home.join(".claude");

    for filename in SHARED_CONFIG_FILES {
        symlink_if_missing(&home_claude.join(filename), &config_dir.join(filename))?;
    }

    let state_src = resolve_state_file(home);
    symlink_if_missing(&state_src, &config_dir.join(".claude.json"))?;

    for dirname in SHARED_CONFIG_DIRS {
        symlink_if_missing(&home_claude.join(dirname), &config_dir.join(dirname))?;
    }

    for dirname in MUTABLE_DIRS {
        std::fs::create_dir_all(config_dir.join(dirname))?;
    }

    Ok(config_dir)
}

/// Removes one agent's config directory. Returns `false` if it didn't exist.
pub fn cleanup_agent_config_dir(agent_name: &str, repo_root: &Path) -> io::Result<bool> {
    let paths = LoomPaths::new(repo_root);
    let config_dir = paths.agent_claude_config_dir(agent_name);
    if config_dir.is_dir() {
        std::fs::remove_dir_all(&config_dir)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Removes every agent config directory, returning the count removed.
pub fn cleanup_all_agent_config_dirs(repo_root: &Path) -> io::Result<usize> {
    let paths = LoomPaths::new(repo_root);
    let base_dir = paths.claude_config_base_dir();
    if !base_dir.is_dir() {
        return Ok(0);
    }
    let mut count = 0;
    for entry in std::fs::read_dir(&base_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(entry.path())?;
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
#[path = "claude_config_tests.rs"]
mod tests;
