// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Loom Daemon (loom-daemon)
//!
//! Background process that reconciles issues, PRs, and shepherd slots
//! against the `loom:` label protocol every `poll_interval` seconds
//! (spec §4.I). Started by a human or by CI, never by another Loom
//! component.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use loom_adapters::cleanup::ProcessCompletionCleanup;
use loom_adapters::launcher::ProcessShepherdLauncher;
use loom_adapters::platform::GhPlatformClient;
use loom_adapters::session::TmuxSessionAdapter;
use loom_core::id::UuidIdGen;
use loom_daemon::tick::{run_tick, ShutdownReason, TickDeps};
use loom_daemon::RuntimeContext;
use loom_engine::{Config, Discipline};
use loom_storage::{find_repo_root, LoomPaths, StateStore};
use tracing::{error, info};

const EXIT_CLEAN: i32 = 0;
const EXIT_STARTUP_FAILURE: i32 = 1;
const EXIT_SESSION_CONFLICT: i32 = 2;
const EXIT_SIGNAL_SHUTDOWN: i32 = 3;
const EXIT_ERROR: i32 = 4;

#[derive(Debug, Parser)]
#[command(name = "loom-daemon", version)]
struct Cli {
    /// Force mode: promote proposals automatically and invoke the real
    /// merge command (implies `--auto-build`).
    #[arg(long)]
    force: bool,
    /// Claim ready issues and launch shepherds automatically.
    #[arg(long)]
    auto_build: bool,
    #[arg(long)]
    debug: bool,
    /// Hard wall-clock timeout in minutes; 0 (default) means none.
    #[arg(long, default_value_t = 0)]
    timeout_min: i64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Hidden: what the launcher re-execs into for a detached shepherd
    /// child. Not part of the documented CLI surface (spec §6).
    #[command(hide = true)]
    ShepherdRun(loom_daemon::shepherd_run::ShepherdRunArgs),
}

struct DaemonArgs {
    force: bool,
    auto_build: bool,
    timeout_min: i64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let Cli { force, auto_build, debug, timeout_min, command } = Cli::parse();

    let repo_root = match find_repo_root(None) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(EXIT_STARTUP_FAILURE);
        }
    };

    if let Some(Command::ShepherdRun(args)) = command {
        let _guard = setup_logging(&repo_root, debug);
        let code = loom_daemon::shepherd_run::run(args, repo_root).await;
        std::process::exit(code);
    }

    let _guard = setup_logging(&repo_root, debug);
    std::process::exit(run_daemon(DaemonArgs { force, auto_build, timeout_min }, repo_root).await);
}

async fn run_daemon(cli: DaemonArgs, repo_root: PathBuf) -> i32 {
    let paths = LoomPaths::new(repo_root.clone());
    let store = StateStore::new(paths.clone());

    let now = loom_core::time_fmt::now_epoch_secs();
    let session_id = Discipline::default_session_id(now);
    let discipline = Discipline::new(paths, session_id.clone());

    if let Err(e) = discipline.acquire_pid_file() {
        error!("{e}");
        return EXIT_SESSION_CONFLICT;
    }

    let mut config = Config::from_env();
    if cli.force {
        config.force_mode = true;
    }
    if cli.auto_build {
        config.auto_build = true;
    }
    config.auto_build = config.auto_build || config.force_mode;
    if cli.timeout_min != 0 {
        config.timeout_min = cli.timeout_min;
    }

    let mut state = store.read_daemon_state();
    state.daemon_session_id = session_id.clone();
    if store.write_daemon_state(&state).is_err() {
        error!("failed to write initial daemon state");
        discipline.release_pid_file();
        return EXIT_ERROR;
    }

    info!(
        "loom-daemon starting (session {}, force_mode={}, auto_build={})",
        session_id, config.force_mode, config.auto_build
    );

    let platform = GhPlatformClient::new();
    let session = TmuxSessionAdapter::new();
    let launcher = match ProcessShepherdLauncher::new() {
        Ok(l) => l,
        Err(e) => {
            error!("failed to resolve current executable: {e}");
            discipline.release_pid_file();
            return EXIT_STARTUP_FAILURE;
        }
    };
    let cleanup = ProcessCompletionCleanup::new(repo_root.clone());
    let id_gen = UuidIdGen;

    let mut ctx = RuntimeContext::new();
    let deadline = if config.timeout_min > 0 {
        Some(now + config.timeout_min * 60)
    } else {
        None
    };

    let deps = TickDeps {
        discipline: &discipline,
        store: &store,
        platform: &platform,
        session: &session,
        launcher: &launcher,
        cleanup: &cleanup,
        id_gen: &id_gen,
        config: &config,
        repo_root: &repo_root,
    };

    let mut exit_code = EXIT_CLEAN;
    loop {
        let now = loom_core::time_fmt::now_epoch_secs();

        if let Some(deadline) = deadline {
            if now >= deadline {
                info!("wall-clock timeout reached, shutting down");
                break;
            }
        }

        let outcome = run_tick(&deps, &mut ctx, now).await;

        if let Some(reason) = outcome.shutdown {
            match reason {
                ShutdownReason::StopSignal => {
                    info!("stop signal observed, shutting down");
                    exit_code = EXIT_SIGNAL_SHUTDOWN;
                    discipline.remove_stop_signal();
                }
                ShutdownReason::SessionSuperseded => {
                    info!("session superseded by another daemon process, yielding");
                }
                ShutdownReason::WallClockTimeout => {
                    info!("wall-clock timeout reached, shutting down");
                }
            }
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_secs(config.poll_interval_secs.max(0) as u64)) => {}
            _ = wait_for_stop_signal(&discipline) => {}
        }
    }

    discipline.release_pid_file();
    info!("loom-daemon stopped");
    exit_code
}

/// Polls for the stop-signal file at a tighter interval than the main
/// loop's sleep, so a stop request is never delayed by a full tick.
async fn wait_for_stop_signal(discipline: &Discipline) {
    loop {
        if discipline.stop_signal_present() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }
}

fn setup_logging(repo_root: &std::path::Path, debug: bool) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = repo_root.join(".loom");
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::never(&log_dir, "daemon.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    guard
}
