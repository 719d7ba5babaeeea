//! Session setup and initialization

use crate::api::{ApiClient, RigApi};
use crate::confirm::{AutoConfirm, ChannelConfirm, Confirm, ConfirmRequest};
use crate::environment::Environment;
use crate::error_classifier::{ErrorClassifier, LogLevel};
use crate::events::{Event, EventType};
use crate::store::DashboardStore;
use crate::workers::{CommandDispatcher, EventSender, ReportController, TelemetryPoller, WorkerConfig};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Pending questions the dashboard can hold at once.
const CONFIRM_QUEUE_SIZE: usize = 4;

/// Who answers confirmation prompts during a session.
#[derive(Debug, Clone, Copy)]
pub enum ConfirmMode {
    /// The dashboard's y/n modal.
    Dashboard,
    /// A fixed answer.
    Auto(bool),
}

/// Session data for both TUI and headless modes
pub struct SessionData {
    pub environment: Environment,
    pub worker_config: WorkerConfig,
    pub store: DashboardStore,
    /// Running telemetry poller. Dropping it stops polling.
    pub poller: TelemetryPoller,
    pub dispatcher: CommandDispatcher,
    pub reports: ReportController,
    /// Event receiver for worker events
    pub event_receiver: mpsc::Receiver<Event>,
    /// Present in [`ConfirmMode::Dashboard`].
    pub confirm_receiver: Option<mpsc::Receiver<ConfirmRequest>>,
    /// Shutdown sender to stop the session
    pub shutdown_sender: broadcast::Sender<()>,
}

/// Sets up a monitoring session
///
/// 1. Creates the rig API client
/// 2. Probes `/health` (a failure is logged, not fatal)
/// 3. Wires the store, dispatcher and report controller
/// 4. Starts the telemetry poller
pub async fn setup_session(
    env: Environment,
    worker_config: WorkerConfig,
    confirm_mode: ConfirmMode,
) -> Result<SessionData, Box<dyn Error>> {
    let api: Arc<dyn RigApi> = Arc::new(ApiClient::new(env.clone())?);
    let (events, event_receiver) = EventSender::channel();
    let store = DashboardStore::new();

    match api.health().await {
        Ok(health) => events.send_poller_event(
            format!("Rig API {} ({})", health.status, health.version),
            EventType::Success,
            LogLevel::Info,
        ),
        Err(e) => events.send_poller_event(
            format!("Health check failed, will keep polling: {}", e),
            EventType::Error,
            ErrorClassifier::new().classify_api_error(&e),
        ),
    }

    let (confirm, confirm_receiver) = match confirm_mode {
        ConfirmMode::Dashboard => {
            let (confirm, receiver) = ChannelConfirm::new(CONFIRM_QUEUE_SIZE);
            (Arc::new(confirm) as Arc<dyn Confirm>, Some(receiver))
        }
        ConfirmMode::Auto(answer) => (Arc::new(AutoConfirm(answer)) as Arc<dyn Confirm>, None),
    };

    let dispatcher = CommandDispatcher::new(
        Arc::clone(&api),
        store.clone(),
        confirm,
        events.clone(),
        worker_config.user.clone(),
    );
    let reports = ReportController::new(
        Arc::clone(&api),
        store.clone(),
        events.clone(),
        worker_config.export_dir.clone(),
    );

    let mut poller = TelemetryPoller::new(api, store.clone(), events, worker_config.poll_interval);
    poller.start();

    // Create shutdown channel - only one shutdown signal needed
    let (shutdown_sender, _) = broadcast::channel(1);

    Ok(SessionData {
        environment: env,
        worker_config,
        store,
        poller,
        dispatcher,
        reports,
        event_receiver,
        confirm_receiver,
        shutdown_sender,
    })
}
