//! Dashboard state store
//!
//! Single owner of the last consistent [`Snapshot`], the transient UI state and
//! the sticky report. All writes go through one `watch` channel, so they are
//! serialized and a snapshot is only ever swapped as a whole.

use crate::api::{Alert, Report, SensorReading, SimulatorStatus};
use crate::consts::cli_consts::{messages, thresholds};
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;

/// The jointly-updated (reading, alerts, simulator) triple produced by one poll cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Absent until the rig has recorded a reading and a poll has succeeded.
    pub reading: Option<SensorReading>,
    /// Active alerts in the order the rig delivered them.
    pub alerts: Vec<Alert>,
    pub simulator: SimulatorStatus,
}

/// Banner text with its own expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientMessage {
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    message: Option<TransientMessage>,
    commands_in_flight: u32,
}

impl UiState {
    /// The banner text, if it has not expired at `now`.
    pub fn message_at(&self, now: Instant) -> Option<&str> {
        self.message
            .as_ref()
            .filter(|m| now < m.expires_at)
            .map(|m| m.text.as_str())
    }

    /// True while at least one command is waiting on the rig.
    pub fn busy(&self) -> bool {
        self.commands_in_flight > 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub snapshot: Snapshot,
    pub ui: UiState,
    /// Last report that was generated successfully.
    pub report: Option<Report>,
    /// Wall-clock time of the last snapshot write.
    pub last_updated: Option<DateTime<Local>>,
    poll_epoch: u64,
}

/// Severity band of a TDS reading.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TdsStatus {
    Unknown,
    Danger,
    Warning,
    Normal,
}

/// Classifies a TDS value in ppm. Total: absent or NaN values are `Unknown`.
pub fn classify_tds(tds_ppm: Option<f64>) -> TdsStatus {
    let Some(tds) = tds_ppm.filter(|v| !v.is_nan()) else {
        return TdsStatus::Unknown;
    };
    if tds < thresholds::TDS_DANGER_LOW || tds > thresholds::TDS_DANGER_HIGH {
        TdsStatus::Danger
    } else if tds < thresholds::TDS_WARNING_LOW || tds > thresholds::TDS_WARNING_HIGH {
        TdsStatus::Warning
    } else {
        TdsStatus::Normal
    }
}

/// Cloneable handle to the shared dashboard state.
#[derive(Debug, Clone)]
pub struct DashboardStore {
    tx: Arc<watch::Sender<StoreState>>,
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StoreState::default());
        Self { tx: Arc::new(tx) }
    }

    /// A copy of the whole state.
    pub fn state(&self) -> StoreState {
        self.tx.borrow().clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().snapshot.clone()
    }

    /// Receiver notified on every visible state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.tx.subscribe()
    }

    /// Current banner text, already filtered for expiry.
    pub fn message(&self) -> Option<String> {
        self.tx
            .borrow()
            .ui
            .message_at(Instant::now())
            .map(str::to_string)
    }

    pub fn busy(&self) -> bool {
        self.tx.borrow().ui.busy()
    }

    /// Transient message and in-flight command count, as one copy.
    pub fn ui_state(&self) -> UiState {
        self.tx.borrow().ui.clone()
    }

    pub fn report(&self) -> Option<Report> {
        self.tx.borrow().report.clone()
    }

    /// Unconditional snapshot swap, used by command-triggered refreshes.
    pub(crate) fn replace_snapshot(&self, snapshot: Snapshot) {
        self.tx.send_modify(|state| {
            state.snapshot = snapshot;
            state.last_updated = Some(Local::now());
        });
    }

    /// Opens a new poll epoch, invalidating every cycle started under an older one.
    pub(crate) fn begin_poll_epoch(&self) -> u64 {
        let mut epoch = 0;
        self.tx.send_if_modified(|state| {
            state.poll_epoch += 1;
            epoch = state.poll_epoch;
            false
        });
        epoch
    }

    /// Writes a poll result if `epoch` is still current. Returns whether it was applied.
    pub(crate) fn apply_poll(&self, epoch: u64, snapshot: Snapshot) -> bool {
        let mut snapshot = Some(snapshot);
        self.tx.send_if_modified(|state| {
            if state.poll_epoch != epoch {
                return false;
            }
            if let Some(snapshot) = snapshot.take() {
                state.snapshot = snapshot;
                state.last_updated = Some(Local::now());
            }
            true
        })
    }

    /// Shows `text` in the banner for the configured lifetime.
    pub(crate) fn set_message(&self, text: impl Into<String>) {
        let message = TransientMessage {
            text: text.into(),
            expires_at: Instant::now() + messages::message_ttl(),
        };
        self.tx.send_modify(|state| state.ui.message = Some(message));
    }

    pub(crate) fn begin_command(&self) {
        self.tx
            .send_modify(|state| state.ui.commands_in_flight += 1);
    }

    pub(crate) fn end_command(&self) {
        self.tx.send_modify(|state| {
            state.ui.commands_in_flight = state.ui.commands_in_flight.saturating_sub(1)
        });
    }

    pub(crate) fn set_report(&self, report: Report) {
        self.tx.send_modify(|state| state.report = Some(report));
    }
}
