//! Shared domain types for Loom: issues, PRs, daemon state, shepherd
//! progress, and the small id/time/env utilities the rest of the workspace
//! builds on.

pub mod clock;
pub mod daemon_state;
pub mod envutil;
pub mod health;
pub mod id;
pub mod issue;
pub mod labels;
pub mod shepherd;
pub mod snapshot;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, SystemClock};
pub use daemon_state::{DaemonState, PendingSpawn, ShepherdEntry, SupportRoleEntry};
pub use health::{AlertsFile, BaselineHealth, BaselineStatus, HealthMetrics, StuckHistory};
pub use id::{IdGen, SequentialIdGen, ShortId, UuidIdGen};
pub use issue::{Issue, Pr};
pub use shepherd::{CompletionEntry, CompletionKind, Milestone, ShepherdExitCode, ShepherdProgress};
pub use snapshot::Snapshot;
