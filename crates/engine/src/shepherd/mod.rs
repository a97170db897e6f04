// SPDX-License-Identifier: MIT

//! Shepherd phase runner (component G): drives a single issue through its
//! six phases, supervising worker sessions and producing a granular exit
//! code. Split into the phase table ([`phases`]), the idle/stuck monitor
//! ([`monitor`]), and the orchestrator itself ([`runner`]) so each piece is
//! independently unit-testable, per spec §4.G and the "tagged variant plus
//! table, not a dispatch hierarchy" REDESIGN FLAG (spec §9).

mod monitor;
mod phases;
mod runner;

pub use monitor::{CriticalAction, IdleAction};
pub use phases::{ApprovalDisposition, PhaseName};
pub use runner::{PhaseResult, PhaseRunner, PhaseStatus, RunMode, ShutdownFlag, NO_CHANGES_MARKER};
