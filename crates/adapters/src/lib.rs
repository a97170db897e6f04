// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the hosting-platform CLI, tmux-backed worker
//! sessions, and per-agent Claude Code config isolation.

pub mod claude_config;
pub mod cleanup;
pub mod launcher;
pub mod platform;
pub mod session;
pub mod subprocess;

pub use claude_config::{cleanup_agent_config_dir, cleanup_all_agent_config_dirs, setup_agent_config_dir};
pub use cleanup::{CompletionCleanup, ProcessCompletionCleanup};
pub use launcher::{LaunchError, ProcessShepherdLauncher, ShepherdLauncher};
pub use platform::{GhPlatformClient, PlatformClient, PlatformError};
pub use session::{SessionAdapter, SessionError, TmuxSessionAdapter};

#[cfg(any(test, feature = "test-support"))]
pub use cleanup::FakeCompletionCleanup;
#[cfg(any(test, feature = "test-support"))]
pub use launcher::{FakeShepherdLauncher, LaunchCall};
#[cfg(any(test, feature = "test-support"))]
pub use platform::FakePlatformClient;
#[cfg(any(test, feature = "test-support"))]
pub use session::{FakeSession, FakeSessionAdapter, SessionCall};
