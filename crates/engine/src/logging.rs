// SPDX-License-Identifier: MIT

//! User-visible `[HH:MM:SS] [LEVEL] ...` log lines, grounded on
//! `loom_tools/common/logging.py`'s level vocabulary and the teacher's
//! `crates/cli/src/color.rs` TTY-detection idiom (spec §7: colorized only
//! when stderr is a TTY, flushed immediately).
//!
//! Distinct from `tracing`, which this workspace also uses for structured
//! diagnostic logging (see `loom-daemon`'s subscriber setup) — this module
//! is strictly the human-facing stderr stream spec §7 describes.

use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Success,
    Error,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Success => "OK",
            Self::Error => "ERROR",
        }
    }

    /// ANSI 256-color code, matching the semantic palette the teacher's
    /// `color::status` uses (green for healthy/success, yellow for
    /// warnings, red for errors).
    fn code(self) -> &'static str {
        match self {
            Self::Info => "\x1b[36m",
            Self::Warning => "\x1b[33m",
            Self::Success => "\x1b[32m",
            Self::Error => "\x1b[31m",
        }
    }
}

const RESET: &str = "\x1b[0m";

fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stderr().is_terminal()
}

fn hh_mm_ss(now_epoch_secs: i64) -> String {
    let secs_in_day = now_epoch_secs.rem_euclid(86_400);
    let h = secs_in_day / 3600;
    let m = (secs_in_day % 3600) / 60;
    let s = secs_in_day % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Write one `[HH:MM:SS] [LEVEL] message` line to stderr, flushed
/// immediately so non-interactive callers observe output without explicit
/// buffer control, per spec §7.
pub fn log(level: Level, message: &str) {
    let timestamp = hh_mm_ss(now_epoch_secs());
    let mut stderr = std::io::stderr();
    if should_colorize() {
        let _ = writeln!(
            stderr,
            "[{timestamp}] {}[{}]{} {message}",
            level.code(),
            level.label(),
            RESET
        );
    } else {
        let _ = writeln!(stderr, "[{timestamp}] [{}] {message}", level.label());
    }
    let _ = stderr.flush();
}

pub fn info(message: &str) {
    log(Level::Info, message);
}

pub fn warning(message: &str) {
    log(Level::Warning, message);
}

pub fn success(message: &str) {
    log(Level::Success, message);
}

pub fn error(message: &str) {
    log(Level::Error, message);
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
