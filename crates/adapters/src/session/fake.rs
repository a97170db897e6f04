// SPDX-License-Identifier: MIT

//! Fake session adapter for testing, grounded on
//! `groblegark-oddjobs/crates/adapters/src/session/fake.rs`.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{SessionAdapter, SessionError};

#[derive(Debug, Clone)]
pub enum SessionCall {
    Spawn {
        name: String,
        cwd: PathBuf,
        cmd: String,
        env: Vec<(String, String)>,
    },
    SendKeys {
        name: String,
        keys: String,
    },
    Kill {
        name: String,
    },
}

#[derive(Debug, Clone)]
pub struct FakeSession {
    pub cwd: PathBuf,
    pub cmd: String,
    pub env: Vec<(String, String)>,
    pub pane: String,
    pub alive: bool,
    pub process_running: bool,
    pub age_secs: i64,
}

struct FakeSessionState {
    sessions: HashMap<String, FakeSession>,
    calls: Vec<SessionCall>,
}

/// In-memory fake implementing [`SessionAdapter`], for phase-runner and
/// action-executor tests that should never shell out to real tmux.
#[derive(Clone)]
pub struct FakeSessionAdapter {
    inner: Arc<Mutex<FakeSessionState>>,
}

impl Default for FakeSessionAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeSessionState {
                sessions: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }
}

impl FakeSessionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.inner.lock().calls.clone()
    }

    pub fn get_session(&self, name: &str) -> Option<FakeSession> {
        self.inner.lock().sessions.get(name).cloned()
    }

    pub fn set_pane(&self, name: &str, text: &str) {
        if let Some(s) = self.inner.lock().sessions.get_mut(name) {
            s.pane = text.to_string();
        }
    }

    pub fn set_process_running(&self, name: &str, running: bool) {
        if let Some(s) = self.inner.lock().sessions.get_mut(name) {
            s.process_running = running;
        }
    }

    pub fn set_age(&self, name: &str, age_secs: i64) {
        if let Some(s) = self.inner.lock().sessions.get_mut(name) {
            s.age_secs = age_secs;
        }
    }

    /// Pre-seed a session as already existing, without going through spawn
    /// (for reclaim-stale / liveness tests).
    pub fn seed(&self, name: &str, alive: bool) {
        self.inner.lock().sessions.insert(
            name.to_string(),
            FakeSession {
                cwd: PathBuf::new(),
                cmd: String::new(),
                env: Vec::new(),
                pane: String::new(),
                alive,
                process_running: alive,
                age_secs: 0,
            },
        );
    }
}

#[async_trait]
impl SessionAdapter for FakeSessionAdapter {
    async fn spawn(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::Spawn {
            name: name.to_string(),
            cwd: cwd.to_path_buf(),
            cmd: cmd.to_string(),
            env: env.to_vec(),
        });
        inner.sessions.insert(
            name.to_string(),
            FakeSession {
                cwd: cwd.to_path_buf(),
                cmd: cmd.to_string(),
                env: env.to_vec(),
                pane: String::new(),
                alive: true,
                process_running: true,
                age_secs: 0,
            },
        );
        Ok(())
    }

    async fn exists(&self, name: &str) -> bool {
        self.inner
            .lock()
            .sessions
            .get(name)
            .map(|s| s.alive)
            .unwrap_or(false)
    }

    async fn capture_pane(&self, name: &str) -> String {
        self.inner
            .lock()
            .sessions
            .get(name)
            .map(|s| s.pane.clone())
            .unwrap_or_default()
    }

    async fn capture_scrollback(&self, name: &str, _lines: u32) -> String {
        self.capture_pane(name).await
    }

    async fn send_keys(&self, name: &str, keys: &str, _modifiers: &[&str]) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::SendKeys {
            name: name.to_string(),
            keys: keys.to_string(),
        });
        if !inner.sessions.contains_key(name) {
            return Err(SessionError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn kill(&self, name: &str) {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::Kill {
            name: name.to_string(),
        });
        if let Some(s) = inner.sessions.get_mut(name) {
            s.alive = false;
        }
    }

    async fn get_shell_pid(&self, name: &str) -> Option<String> {
        self.exists(name).await.then(|| "1234".to_string())
    }

    async fn get_session_age(&self, name: &str) -> i64 {
        self.inner
            .lock()
            .sessions
            .get(name)
            .map(|s| if s.alive { s.age_secs } else { -1 })
            .unwrap_or(-1)
    }

    async fn is_process_running(&self, name: &str, _pattern: &str) -> bool {
        self.inner
            .lock()
            .sessions
            .get(name)
            .map(|s| s.process_running)
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
