//! Log level threshold handling.
//!
//! The activity log honours `RUST_LOG` the same way `log` consumers do, so one
//! variable controls both the dashboard panel and any installed logger.

use crate::error_classifier::LogLevel;
use std::env;
use std::sync::OnceLock;

static THRESHOLD: OnceLock<LogLevel> = OnceLock::new();

/// The `RUST_LOG` threshold, read once per process.
pub fn log_threshold() -> LogLevel {
    *THRESHOLD.get_or_init(|| {
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        parse_rust_log_level(&rust_log)
    })
}

/// Extracts the global level from `RUST_LOG` (`debug`, `dualfarm=debug,reqwest=info`, ...).
pub fn parse_rust_log_level(rust_log: &str) -> LogLevel {
    let level_str = rust_log
        .split(',')
        .next()
        .unwrap_or(rust_log)
        .split('=')
        .next_back()
        .unwrap_or(rust_log)
        .trim()
        .to_lowercase();

    match level_str.as_str() {
        "trace" => LogLevel::Trace,
        "debug" => LogLevel::Debug,
        "info" => LogLevel::Info,
        "warn" | "warning" => LogLevel::Warn,
        "error" => LogLevel::Error,
        _ => LogLevel::Info,
    }
}

pub fn should_log(event_level: LogLevel, threshold: LogLevel) -> bool {
    event_level >= threshold
}

pub fn should_log_with_env(event_level: LogLevel) -> bool {
    should_log(event_level, log_threshold())
}

/// Mirrors an activity event into the `log` facade under the worker's target.
pub fn emit(level: LogLevel, target: &str, msg: &str) {
    log::log!(target: target, log::Level::from(level), "{}", msg);
}
