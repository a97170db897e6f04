// SPDX-License-Identifier: MIT

//! Subprocess execution helpers, grounded on
//! `groblegark-oddjobs/crates/adapters/src/subprocess.rs`'s
//! timeout-wrapped `Command::output()` idiom.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for tmux commands.
pub const TMUX_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for `gh` CLI invocations.
pub const GH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for the external cleanup collaborator
/// (`loom-daemon-cleanup shepherd-complete <issue>`), per
/// `daemon_v2/actions/completions.py::_trigger_shepherd_cleanup`.
pub const CLEANUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Run a subprocess command with a timeout. The child is killed by tokio's
/// `Child` drop implementation if the timeout elapses.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{description} failed: {io_err}")),
        Err(_elapsed) => Err(format!(
            "{description} timed out after {}s",
            timeout.as_secs()
        )),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
