//! Duration/timestamp formatting, grounded 1:1 on
//! `loom_tools/common/time_utils.py`.

use std::time::{SystemTime, UNIX_EPOCH};

/// Render a duration in seconds as `"1h 1m 1s"`-style text. Negative and
/// zero durations both render as `"0s"`. Trailing zero components are
/// dropped, but if every component is zero the trailing `"0s"` is kept.
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return "0s".to_string();
    }
    let hours = seconds / 3600;
    let remainder = seconds % 3600;
    let minutes = remainder / 60;
    let secs = remainder % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{secs}s"));
    }
    parts.join(" ")
}

/// Seconds since the Unix epoch, clamped to zero if the clock is somehow
/// before 1970 (never happens off a real clock, but avoids a panic on a
/// corrupt/mocked one).
pub fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// How many seconds have elapsed since an epoch-seconds timestamp. Negative
/// if `ts` is in the future (a clock skew, not clamped away — callers decide
/// what to do with it).
pub fn elapsed_seconds(ts: i64) -> i64 {
    now_epoch_secs() - ts
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
