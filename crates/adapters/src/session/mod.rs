// SPDX-License-Identifier: MIT

//! Session supervisor (component D): starts, observes, and terminates
//! worker sessions inside a terminal multiplexer. Grounded directly on
//! `groblegark-oddjobs/crates/adapters/src/session/{mod.rs,tmux.rs}` for
//! the Rust trait shape, and 1:1 on
//! `loom_tools/common/tmux_session.py::TmuxSession` for exact semantics.

mod tmux;

pub use tmux::TmuxSessionAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSession, FakeSessionAdapter, SessionCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// The indicator Claude Code shows in its status bar while actively
/// processing a turn, 1:1 from `tmux_session.py::PROCESSING_INDICATORS`.
/// Used by the phase runner's idle-time monitor (spec §4.G).
pub const PROCESSING_INDICATOR: &str = "esc to interrupt";

/// The indicator Claude Code shows when it is blocked on a permission
/// prompt awaiting a keypress, 1:1 from
/// `tmux_session.py::PENDING_PROMPT_INDICATORS`. Used by the phase
/// runner's distinct "prompt-stuck" detector (spec §4.G).
pub const PENDING_PROMPT_INDICATOR: &str = "Do you want to proceed?";

/// Adapter for managing terminal-multiplexer worker sessions. All
/// underlying CLI errors fold into conservative defaults per spec §4.D —
/// callers of `exists`/`get_session_age` never see a transport error, only
/// `false`/`-1`.
#[async_trait]
pub trait SessionAdapter: Send + Sync + 'static {
    /// Start a new session running `cmd` in `cwd`. If a session with this
    /// name already exists it is killed and recreated first.
    async fn spawn(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), SessionError>;

    /// Whether a session by this name is currently alive.
    async fn exists(&self, name: &str) -> bool;

    /// The visible content of the pane right now.
    async fn capture_pane(&self, name: &str) -> String;

    /// The last `lines` of scrollback, including history.
    async fn capture_scrollback(&self, name: &str, lines: u32) -> String;

    /// Send a tmux key sequence, plus any extra modifier tokens
    /// (e.g. `"C-m"` for Enter).
    async fn send_keys(&self, name: &str, keys: &str, modifiers: &[&str]) -> Result<(), SessionError>;

    async fn kill(&self, name: &str);

    /// The PID of the session's first pane's shell, if any.
    async fn get_shell_pid(&self, name: &str) -> Option<String>;

    /// Seconds since the session was created, or `-1` if it doesn't exist
    /// or the age can't be determined.
    async fn get_session_age(&self, name: &str) -> i64;

    /// Whether a process matching `pattern` is running in the session,
    /// checked against both the pane's own command and its children.
    async fn is_process_running(&self, name: &str, pattern: &str) -> bool;
}
