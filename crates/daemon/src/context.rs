// SPDX-License-Identifier: MIT

//! In-process runtime counters that the original keeps on
//! `daemon_v2.context.DaemonContext` rather than persisting to disk —
//! `orchestration_active`, `consecutive_stalled`, `iteration` all reset to
//! their defaults on every process restart, unlike anything in
//! [`loom_core::DaemonState`].

/// Per-process tick bookkeeping, not written to `STATE/`.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Tick counter since this process started.
    pub iteration: u64,
    /// Ticks in a row where ready work existed but nothing moved forward
    /// (no completion, spawn, promotion, or escalation), feeding
    /// `health_status` per spec §4.E.
    pub consecutive_stalled: u32,
    /// Gate on `spawn_shepherds`, per spec.md §9 "Open questions" and
    /// `daemon_v2/context.py`: starts `false`, flipped by an inbound
    /// `start_orchestration`/`stop_orchestration` signal (spec §4.H). The
    /// daemon still drains signals and retries `pending_spawns` while
    /// `false`, it just never starts new auto-claims.
    pub orchestration_active: bool,
}

impl RuntimeContext {
    pub fn new() -> Self {
        Self {
            iteration: 0,
            consecutive_stalled: 0,
            orchestration_active: false,
        }
    }

    pub fn note_progress(&mut self, ready_work: bool, progressed: bool) {
        if ready_work && !progressed {
            self.consecutive_stalled += 1;
        } else {
            self.consecutive_stalled = 0;
        }
        self.iteration += 1;
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
