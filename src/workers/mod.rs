//! Background workers: telemetry polling, command dispatch and reports.

pub mod core;
pub mod dispatcher;
pub mod poller;
pub mod reports;

#[cfg(test)]
pub(crate) mod testing;

pub use self::core::{EventSender, WorkerConfig};
pub use dispatcher::{CommandDispatcher, DispatchError, DoseAmount, DoseError};
pub use poller::{SnapshotError, TelemetryPoller, fetch_snapshot};
pub use reports::ReportController;
