use crate::environment::Environment;
use crate::api::error::ApiError;
use std::path::{Path, PathBuf};

pub(crate) mod client;
pub use client::ApiClient;
pub mod error;
pub mod types;

pub use types::{
    Alert, ControlAction, Health, HistoryRange, PumpState, Report, SensorReading, Severity,
    SimulatorStatus,
};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RigApi: Send + Sync {
    fn environment(&self) -> &Environment;

    /// Liveness probe of the rig API.
    async fn health(&self) -> Result<Health, ApiError>;

    /// Most recent sensor reading, or `None` while the rig has recorded nothing yet.
    async fn latest_reading(&self) -> Result<Option<SensorReading>, ApiError>;

    /// Sensor readings within the given window, in the order the rig returns them.
    async fn reading_history(&self, range: HistoryRange)
    -> Result<Vec<SensorReading>, ApiError>;

    /// Currently active alerts.
    async fn latest_alerts(&self) -> Result<Vec<Alert>, ApiError>;

    /// Recent alerts, resolved ones included.
    async fn alert_history(&self) -> Result<Vec<Alert>, ApiError>;

    async fn simulator_status(&self) -> Result<SimulatorStatus, ApiError>;

    async fn start_simulator(&self) -> Result<SimulatorStatus, ApiError>;

    async fn stop_simulator(&self) -> Result<SimulatorStatus, ApiError>;

    /// Switches the pump, attributed to `user`.
    async fn set_pump(&self, state: PumpState, user: &str) -> Result<ControlAction, ApiError>;

    /// Doses `amount_ml` of nutrients, attributed to `user`.
    async fn dose(&self, amount_ml: u32, user: &str) -> Result<ControlAction, ApiError>;

    /// Recent control actions, newest first.
    async fn control_history(&self) -> Result<Vec<ControlAction>, ApiError>;

    async fn report(&self) -> Result<Report, ApiError>;

    /// Streams the CSV export into `dir` and returns the path written.
    async fn export_csv(&self, dir: &Path) -> Result<PathBuf, ApiError>;
}
