//! Core worker utilities

use crate::consts::cli_consts::{DEFAULT_USER, EVENT_QUEUE_SIZE, polling};
use crate::error_classifier::LogLevel;
use crate::events::{Event, EventType};
use crate::logging;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

/// Common event sending utilities for workers.
///
/// Sends never wait: a full queue drops the event so a slow UI cannot stall
/// polling or command dispatch. Every event is also mirrored to `log`.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with the receiving end of its queue.
    pub fn channel() -> (Self, mpsc::Receiver<Event>) {
        let (sender, receiver) = mpsc::channel(EVENT_QUEUE_SIZE);
        (Self::new(sender), receiver)
    }

    /// Send a generic event
    pub fn send_event(&self, event: Event) {
        logging::emit(event.log_level, event.worker.log_target(), &event.msg);
        let _ = self.sender.try_send(event);
    }

    pub fn send_poller_event(&self, message: String, event_type: EventType, log_level: LogLevel) {
        self.send_event(Event::poller(message, event_type, log_level));
    }

    pub fn send_dispatcher_event(
        &self,
        message: String,
        event_type: EventType,
        log_level: LogLevel,
    ) {
        self.send_event(Event::dispatcher(message, event_type, log_level));
    }

    pub fn send_report_event(&self, message: String, event_type: EventType, log_level: LogLevel) {
        self.send_event(Event::reports(message, event_type, log_level));
    }
}

/// Worker configuration shared across all worker types
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Attribution sent with every mutating command.
    pub user: String,
    pub poll_interval: Duration,
    /// Where CSV exports land.
    pub export_dir: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            poll_interval: polling::poll_interval(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl WorkerConfig {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            user: config.user.clone(),
            poll_interval: config.poll_interval(),
            export_dir: config.export_dir(),
        }
    }
}
