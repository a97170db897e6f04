// SPDX-License-Identifier: MIT

//! The daemon loop binary's library half (component I): wires the
//! snapshot builder, action executors, and signal/session discipline from
//! `loom-engine` into the nine-step tick contract of spec §4.I, plus the
//! in-process runtime counters (`orchestration_active`,
//! `consecutive_stalled`, `iteration`) that `daemon_v2/context.py` keeps
//! in memory rather than persisting.
//!
//! Split out from `main.rs` so the tick contract is testable against fake
//! adapters without forking a real process or touching a real tmux socket.

pub mod context;
pub mod health;
pub mod shepherd_run;
pub mod tick;

pub use context::RuntimeContext;
pub use health::HealthStatus;
pub use tick::{run_tick, ShutdownReason, TickDeps, TickOutcome};
