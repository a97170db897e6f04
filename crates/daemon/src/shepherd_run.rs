// SPDX-License-Identifier: MIT

//! The hidden `shepherd-run` subcommand: what `loom-daemon` re-execs into
//! when `ProcessShepherdLauncher::spawn_shepherd` launches a detached
//! child (spec §4.F step 3). One process, two faces — grounded on the
//! launcher's own doc comment, which chose re-exec over a second
//! `loom-shepherd` binary the original's packaging never names.

use std::path::PathBuf;
use std::sync::Arc;

use loom_adapters::platform::GhPlatformClient;
use loom_adapters::session::TmuxSessionAdapter;
use loom_core::clock::SystemClock;
use loom_engine::shepherd::{PhaseName, PhaseRunner, RunMode, ShutdownFlag};
use loom_engine::Config;
use loom_storage::{LoomPaths, StateStore};

#[derive(Debug, clap::Args)]
pub struct ShepherdRunArgs {
    /// Issue number to shepherd through the pipeline.
    pub issue: u64,
    /// Invoke the external merge command in the merge phase instead of
    /// waiting for `loom:pr`. Always passed by the launcher (spec §4.F
    /// step 3); kept as a flag so a human can also invoke this
    /// subcommand directly while debugging.
    #[arg(long)]
    pub merge: bool,
    /// Skip the worktree-cleanliness precondition the curator phase would
    /// otherwise enforce.
    #[arg(long)]
    pub allow_dirty_main: bool,
    #[arg(long)]
    pub task_id: String,
    /// Resume from this phase instead of the start of the pipeline.
    #[arg(long)]
    pub from: Option<String>,
}

/// Run the phase pipeline for one issue to completion and return the exit
/// code the process should terminate with, per spec §4.G's exit-code
/// table.
pub async fn run(args: ShepherdRunArgs, repo_root: PathBuf) -> i32 {
    let paths = LoomPaths::new(repo_root);
    let store = StateStore::new(paths);
    let config = Config::from_env();

    let platform: Arc<dyn loom_adapters::platform::PlatformClient> = Arc::new(GhPlatformClient::new());
    let session: Arc<dyn loom_adapters::session::SessionAdapter> = Arc::new(TmuxSessionAdapter::new());
    let clock = Arc::new(SystemClock);
    let shutdown = ShutdownFlag::new();

    install_shutdown_signal_handler(shutdown.clone());

    let runner = PhaseRunner::new(platform, session, store, clock, config.clone(), shutdown);

    let from_phase = args.from.as_deref().and_then(PhaseName::from_str);
    let mode = RunMode {
        force: args.merge || config.force_mode,
        allow_dirty_main: args.allow_dirty_main,
    };

    let exit_code = runner.run(args.issue, &args.task_id, from_phase, mode).await;
    exit_code.code()
}

/// A shepherd terminates itself on the same stop signal the daemon
/// watches for (spec §5 "Cancellation"), so it installs its own SIGTERM
/// handler rather than relying on the parent to kill it.
fn install_shutdown_signal_handler(flag: ShutdownFlag) {
    tokio::spawn(async move {
        if let Ok(mut sigterm) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            sigterm.recv().await;
            flag.trigger();
        }
    });
}
