//! Environment-variable parsing helpers, grounded 1:1 on
//! `loom_tools/common/config.py`.

use std::str::FromStr;

const TRUE_TOKENS: &[&str] = &["true", "1", "yes", "on"];
const FALSE_TOKENS: &[&str] = &["false", "0", "no", "off"];

pub fn env_str(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

pub fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(raw) => {
            let lower = raw.trim().to_ascii_lowercase();
            if TRUE_TOKENS.contains(&lower.as_str()) {
                true
            } else if FALSE_TOKENS.contains(&lower.as_str()) {
                false
            } else {
                default
            }
        }
        Err(_) => default,
    }
}

fn env_parsed<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub fn env_int(name: &str, default: i64) -> i64 {
    env_parsed(name, default)
}

pub fn env_float(name: &str, default: f64) -> f64 {
    env_parsed(name, default)
}

/// Comma-separated (or `sep`-separated) list, blank entries dropped.
pub fn env_list(name: &str, sep: &str, default: Vec<String>) -> Vec<String> {
    match std::env::var(name) {
        Ok(raw) => {
            let items: Vec<String> = raw
                .split(sep)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if items.is_empty() {
                default
            } else {
                items
            }
        }
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "envutil_tests.rs"]
mod tests;
