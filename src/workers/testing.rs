//! In-memory rig used where a call has to stay pending on purpose.

use crate::api::error::ApiError;
use crate::api::types::{
    Alert, ControlAction, Health, HistoryRange, PumpState, Report, SensorReading, Severity,
    SimulatorStatus,
};
use crate::api::RigApi;
use crate::environment::Environment;
use crate::store::fixtures;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Notify, Semaphore};

pub struct FakeRig {
    environment: Environment,
    pub reading_calls: AtomicUsize,
    pub alerts_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub fail_alerts: AtomicBool,
    tds_ppm: Mutex<f64>,
    gated: AtomicBool,
    gate: Semaphore,
    /// Signalled each time `latest_reading` is entered.
    pub entered: Notify,
    hold_commands: AtomicBool,
    /// Signalled each time a control command is entered.
    pub command_entered: Notify,
}

impl FakeRig {
    pub fn new(tds_ppm: f64) -> Self {
        Self {
            environment: Environment::Local,
            reading_calls: AtomicUsize::new(0),
            alerts_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            fail_alerts: AtomicBool::new(false),
            tds_ppm: Mutex::new(tds_ppm),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
            entered: Notify::new(),
            hold_commands: AtomicBool::new(false),
            command_entered: Notify::new(),
        }
    }

    /// Holds every `latest_reading` call until [`FakeRig::release`].
    pub fn gated(tds_ppm: f64) -> Self {
        let rig = Self::new(tds_ppm);
        rig.gated.store(true, Ordering::SeqCst);
        rig
    }

    /// Holds every control command until [`FakeRig::release`]; reads stay ungated.
    pub fn holding_commands(tds_ppm: f64) -> Self {
        let rig = Self::new(tds_ppm);
        rig.hold_commands.store(true, Ordering::SeqCst);
        rig
    }

    pub fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    pub fn set_tds(&self, tds_ppm: f64) {
        *self.tds_ppm.lock().unwrap() = tds_ppm;
    }

    pub fn reading_calls(&self) -> usize {
        self.reading_calls.load(Ordering::SeqCst)
    }
}

fn unsupported() -> ApiError {
    ApiError::Http {
        status: 501,
        message: "not supported by FakeRig".to_string(),
    }
}

#[async_trait::async_trait]
impl RigApi for FakeRig {
    fn environment(&self) -> &Environment {
        &self.environment
    }

    async fn health(&self) -> Result<Health, ApiError> {
        Err(unsupported())
    }

    async fn latest_reading(&self) -> Result<Option<SensorReading>, ApiError> {
        self.reading_calls.fetch_add(1, Ordering::SeqCst);
        let tds = *self.tds_ppm.lock().unwrap();
        self.entered.notify_one();
        if self.gated.load(Ordering::SeqCst) {
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }
        Ok(Some(fixtures::reading(tds, PumpState::On)))
    }

    async fn reading_history(&self, _range: HistoryRange) -> Result<Vec<SensorReading>, ApiError> {
        Err(unsupported())
    }

    async fn latest_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.alerts_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_alerts.load(Ordering::SeqCst) {
            return Err(ApiError::Http {
                status: 503,
                message: "alerts unavailable".to_string(),
            });
        }
        Ok(vec![
            fixtures::alert(1, "tds_high", Severity::Critical),
            fixtures::alert(2, "water_level_low", Severity::Warning),
        ])
    }

    async fn alert_history(&self) -> Result<Vec<Alert>, ApiError> {
        Err(unsupported())
    }

    async fn simulator_status(&self) -> Result<SimulatorStatus, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(SimulatorStatus {
            running: true,
            message: "Simulator is running".to_string(),
        })
    }

    async fn start_simulator(&self) -> Result<SimulatorStatus, ApiError> {
        Err(unsupported())
    }

    async fn stop_simulator(&self) -> Result<SimulatorStatus, ApiError> {
        Err(unsupported())
    }

    async fn set_pump(&self, state: PumpState, user: &str) -> Result<ControlAction, ApiError> {
        self.command_entered.notify_one();
        if self.hold_commands.load(Ordering::SeqCst) {
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }
        Ok(ControlAction {
            id: 1,
            timestamp: Utc::now(),
            action_type: "pump".to_string(),
            action_value: state.to_string(),
            user: user.to_string(),
        })
    }

    async fn dose(&self, _amount_ml: u32, _user: &str) -> Result<ControlAction, ApiError> {
        Err(unsupported())
    }

    async fn control_history(&self) -> Result<Vec<ControlAction>, ApiError> {
        Err(unsupported())
    }

    async fn report(&self) -> Result<Report, ApiError> {
        Err(unsupported())
    }

    async fn export_csv(&self, _dir: &Path) -> Result<PathBuf, ApiError> {
        Err(unsupported())
    }
}
