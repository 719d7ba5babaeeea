//! Event System
//!
//! Activity events emitted by the poller, dispatcher and report controller.

use crate::error_classifier::LogLevel;
use crate::logging::should_log_with_env;
use chrono::Local;
use std::fmt::Display;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Worker {
    /// Periodic snapshot fetcher.
    Poller,
    /// Confirmed actuator and simulator commands.
    Dispatcher,
    /// Report generation and CSV export.
    Reports,
}

impl Worker {
    /// `log` target the event is mirrored under.
    pub fn log_target(&self) -> &'static str {
        match self {
            Worker::Poller => "dualfarm::poller",
            Worker::Dispatcher => "dualfarm::dispatcher",
            Worker::Reports => "dualfarm::reports",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    Success,
    Error,
    Refresh,
    Waiting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub worker: Worker,
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
}

impl Event {
    pub fn new(worker: Worker, msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self {
            worker,
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
        }
    }

    pub fn poller(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Worker::Poller, msg, event_type, log_level)
    }

    pub fn dispatcher(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Worker::Dispatcher, msg, event_type, log_level)
    }

    pub fn reports(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Worker::Reports, msg, event_type, log_level)
    }

    pub fn should_display(&self) -> bool {
        // Always show success events and info level events
        if self.event_type == EventType::Success || self.log_level >= LogLevel::Info {
            return true;
        }
        should_log_with_env(self.log_level)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.event_type, self.timestamp, self.msg)
    }
}
