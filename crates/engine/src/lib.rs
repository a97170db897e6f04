// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The reconciliation core: snapshot builder (E), action executors (F),
//! shepherd phase runner (G), and signal/session discipline (H).
//!
//! `loom-daemon` ties these together into the tick contract of spec §4.I;
//! this crate holds everything that is pure reconciliation logic over a
//! [`loom_storage::StateStore`] and the [`loom_adapters`] traits.

pub mod actions;
pub mod config;
pub mod discipline;
pub mod logging;
pub mod shepherd;
pub mod snapshot;

pub use config::{Config, IssueStrategy};
pub use discipline::{Discipline, DisciplineError, InboundCommand};
pub use shepherd::{PhaseResult, PhaseRunner, PhaseStatus};
pub use snapshot::build_snapshot;
