// SPDX-License-Identifier: MIT

//! Tmux-backed session adapter. All Loom-managed sessions share one named
//! socket (`-L loom`), matching `tmux_session.py::TMUX_SOCKET = "loom"`.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use super::{SessionAdapter, SessionError};
use crate::subprocess::{run_with_timeout, TMUX_TIMEOUT};

const SOCKET: &str = "loom";

#[derive(Debug, Clone, Default)]
pub struct TmuxSessionAdapter;

impl TmuxSessionAdapter {
    pub fn new() -> Self {
        Self
    }

    fn base_cmd(&self) -> Command {
        let mut cmd = Command::new("tmux");
        cmd.args(["-L", SOCKET]);
        cmd
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, String> {
        let mut cmd = self.base_cmd();
        cmd.args(args);
        run_with_timeout(cmd, TMUX_TIMEOUT, "tmux").await
    }
}

#[async_trait]
impl SessionAdapter for TmuxSessionAdapter {
    async fn spawn(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), SessionError> {
        if !cwd.exists() {
            return Err(SessionError::SpawnFailed(format!(
                "working directory does not exist: {}",
                cwd.display()
            )));
        }

        if self.exists(name).await {
            self.kill(name).await;
        }

        let mut tmux_cmd = self.base_cmd();
        tmux_cmd
            .arg("new-session")
            .arg("-d")
            .arg("-s")
            .arg(name)
            .arg("-c")
            .arg(cwd);
        for (key, value) in env {
            tmux_cmd.arg("-e").arg(format!("{key}={value}"));
        }
        tmux_cmd.arg(cmd);

        let output = run_with_timeout(tmux_cmd, TMUX_TIMEOUT, "tmux new-session")
            .await
            .map_err(SessionError::SpawnFailed)?;
        if !output.status.success() {
            return Err(SessionError::SpawnFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }
        Ok(())
    }

    async fn exists(&self, name: &str) -> bool {
        self.run(&["has-session", "-t", name])
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn capture_pane(&self, name: &str) -> String {
        self.run(&["capture-pane", "-t", name, "-p"])
            .await
            .ok()
            .filter(|o| o.status.success())
            .map(|o| String::from_utf8_lossy(&o.stdout).to_string())
            .unwrap_or_default()
    }

    async fn capture_scrollback(&self, name: &str, lines: u32) -> String {
        let arg = format!("-{lines}");
        self.run(&["capture-pane", "-t", name, "-p", "-S", &arg])
            .await
            .ok()
            .filter(|o| o.status.success())
            .map(|o| String::from_utf8_lossy(&o.stdout).to_string())
            .unwrap_or_default()
    }

    async fn send_keys(&self, name: &str, keys: &str, modifiers: &[&str]) -> Result<(), SessionError> {
        let mut args: Vec<&str> = vec!["send-keys", "-t", name, keys];
        args.extend_from_slice(modifiers);
        let output = self
            .run(&args)
            .await
            .map_err(SessionError::CommandFailed)?;
        if !output.status.success() {
            return Err(SessionError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn kill(&self, name: &str) {
        let _ = self.run(&["kill-session", "-t", name]).await;
    }

    async fn get_shell_pid(&self, name: &str) -> Option<String> {
        let output = self
            .run(&["list-panes", "-t", name, "-F", "#{pane_pid}"])
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let text = String::from_utf8_lossy(&output.stdout);
        let first = text.trim().lines().next()?.trim();
        if first.is_empty() {
            None
        } else {
            Some(first.to_string())
        }
    }

    async fn get_session_age(&self, name: &str) -> i64 {
        let Ok(output) = self
            .run(&["display-message", "-t", name, "-p", "#{session_created}"])
            .await
        else {
            return -1;
        };
        if !output.status.success() {
            return -1;
        }
        let raw = String::from_utf8_lossy(&output.stdout);
        let Ok(created_at) = raw.trim().parse::<i64>() else {
            return -1;
        };
        if created_at == 0 {
            return -1;
        }
        let now = loom_core::time_fmt::now_epoch_secs();
        now - created_at
    }

    async fn is_process_running(&self, name: &str, pattern: &str) -> bool {
        let Some(pane_pid) = self.get_shell_pid(name).await else {
            return false;
        };

        let ps = {
            let mut cmd = Command::new("ps");
            cmd.args(["-p", &pane_pid, "-o", "command="]);
            run_with_timeout(cmd, TMUX_TIMEOUT, "ps").await
        };
        if let Ok(output) = &ps {
            if output.status.success() {
                let cmd_line = String::from_utf8_lossy(&output.stdout);
                if cmd_line.contains(pattern) {
                    return true;
                }
            }
        }

        let pgrep = {
            let mut cmd = Command::new("pgrep");
            cmd.args(["-P", &pane_pid, "-f", pattern]);
            run_with_timeout(cmd, TMUX_TIMEOUT, "pgrep").await
        };
        pgrep.map(|o| o.status.success()).unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
