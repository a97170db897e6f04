//! Atomic JSON state storage and repository-root discovery.
//!
//! Grounded on `loom_tools/common/state.py` for read/write semantics and on
//! `oj-storage::checkpoint`'s temp-file-then-rename mechanics for the Rust
//! idiom (without the WAL/zstd/migration machinery that crate carries —
//! Loom's state is one small JSON file per concern, not an event-sourced
//! log; see DESIGN.md).

pub mod atomic;
pub mod paths;
pub mod repo;
pub mod state_store;

pub use atomic::{read_json_or_default, write_json_atomic, AtomicWriteError};
pub use paths::LoomPaths;
pub use repo::{find_repo_root, RepoError};
pub use state_store::StateStore;
