// SPDX-License-Identifier: MIT

//! `loom-baseline-health` — report/check/show the default branch's test
//! health, grounded 1:1 on `loom_tools/baseline_health_cli.py`.
//!
//! Used by the Auditor support role to report main-branch health, and by
//! shepherd preflight checks (spec §3 "consumed ... by phase runners'
//! preflight checks") to decide whether it is safe to start building.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use loom_cli::{print_json, resolve_repo_root, EXIT_FAILURE, EXIT_OK};
use loom_core::health::{BaselineHealth, BaselineStatus};
use loom_core::time_fmt::{format_duration, now_epoch_ms};
use loom_storage::StateStore;

#[derive(Debug, Parser)]
#[command(name = "loom-baseline-health", version, about = "Manage baseline health status for shepherd pre-flight checks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report baseline health status.
    Report {
        #[arg(long, value_enum)]
        status: StatusArg,
        /// Name of a failing test (repeatable).
        #[arg(long = "test")]
        tests: Vec<String>,
        /// Issue tracking the failure (e.g. "#2042").
        #[arg(long)]
        issue: Option<String>,
        /// Cache TTL in minutes.
        #[arg(long, default_value_t = 15)]
        ttl: i64,
        /// Print the report as JSON instead of plain stderr lines.
        #[arg(long)]
        json: bool,
    },
    /// Check baseline health (exit code only; 0=healthy 1=failing 2=unknown/stale).
    Check,
    /// Show current baseline health (human-readable).
    Show {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum StatusArg {
    Healthy,
    Failing,
    Unknown,
}

impl From<StatusArg> for BaselineStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Healthy => BaselineStatus::Healthy,
            StatusArg::Failing => BaselineStatus::Failing,
            StatusArg::Unknown => BaselineStatus::Unknown,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(repo_root) = resolve_repo_root() else {
        return EXIT_FAILURE;
    };
    let store = StateStore::new(loom_storage::LoomPaths::new(repo_root));

    match cli.command {
        Command::Report { status, tests, issue, ttl, json } => cmd_report(&store, status, tests, issue, ttl, json),
        Command::Check => cmd_check(&store),
        Command::Show { json } => cmd_show(&store, json),
    }
}

fn cmd_report(store: &StateStore, status: StatusArg, tests: Vec<String>, issue: Option<String>, ttl: i64, json: bool) -> ExitCode {
    let health = BaselineHealth {
        status: status.into(),
        tests: tests.clone(),
        issue_tag: issue.clone(),
        reported_at_epoch_ms: now_epoch_ms(),
        ttl_secs: Some((ttl.max(0) as u64) * 60),
    };

    if store.write_baseline_health(&health).is_err() {
        eprintln!("error: failed to write baseline health");
        return EXIT_FAILURE;
    }

    if json {
        print_json(&health);
    } else {
        eprintln!("Baseline health: {}", health.status);
        for t in &tests {
            eprintln!("  - {t}");
        }
        if let Some(issue) = &issue {
            eprintln!("Tracking: {issue}");
        }
    }
    EXIT_OK
}

/// Exit codes: 0=healthy, 1=failing, 2=unknown or stale (TTL elapsed).
fn cmd_check(store: &StateStore) -> ExitCode {
    let health = store.read_baseline_health();
    let now = now_epoch_ms();
    if !health.is_fresh(now) {
        return ExitCode::from(2);
    }
    match health.status {
        BaselineStatus::Healthy => EXIT_OK,
        BaselineStatus::Failing => EXIT_FAILURE,
        BaselineStatus::Unknown => ExitCode::from(2),
    }
}

fn cmd_show(store: &StateStore, json: bool) -> ExitCode {
    let health = store.read_baseline_health();

    if json {
        print_json(&health);
        return EXIT_OK;
    }

    println!("Status: {}", health.status);
    let now = now_epoch_ms();
    if health.reported_at_epoch_ms > 0 {
        let elapsed_secs = (now - health.reported_at_epoch_ms).max(0) / 1000;
        println!("Reported: {} ago", format_duration(elapsed_secs));
    }
    if !health.tests.is_empty() {
        println!("Failing tests:");
        for t in &health.tests {
            println!("  - {t}");
        }
    }
    if let Some(issue) = &health.issue_tag {
        println!("Tracking: {issue}");
    }
    if let Some(ttl) = health.ttl_secs {
        println!("Cache TTL: {}", format_duration(ttl as i64));
    }
    EXIT_OK
}
