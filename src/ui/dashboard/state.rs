//! Dashboard state management
//!
//! Holds what the dashboard screen owns on top of the store: the activity log,
//! the dose input and the confirmation currently on screen.

use super::view::DashboardView;
use crate::confirm::ConfirmRequest;
use crate::consts::cli_consts::MAX_ACTIVITY_LOGS;
use crate::environment::Environment;
use crate::events::Event as WorkerEvent;
use crate::store::StoreState;
use crate::ui::app::UIConfig;
use crate::workers::DoseAmount;

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct DashboardState {
    /// The rig deployment being monitored.
    pub environment: Environment,
    /// Operator name attached to commands.
    pub user: String,
    pub poll_interval: Duration,
    /// The start time of the application, used for computing uptime.
    pub start_time: Instant,
    /// Latest projection of the store.
    pub view: DashboardView,
    /// Activity logs for display (last `MAX_ACTIVITY_LOGS` events)
    pub activity_logs: VecDeque<WorkerEvent>,
    /// Amount sent by the next dose command.
    pub dose: DoseAmount,
    /// Question waiting for y/n, if any.
    pub pending_confirm: Option<ConfirmRequest>,
    pub with_background_color: bool,
    /// Animation tick counter
    pub tick: usize,
}

impl DashboardState {
    pub fn new(
        environment: Environment,
        start_time: Instant,
        store_state: &StoreState,
        ui_config: UIConfig,
    ) -> Self {
        Self {
            environment,
            user: ui_config.user,
            poll_interval: ui_config.poll_interval,
            start_time,
            view: DashboardView::build(store_state, Instant::now()),
            activity_logs: VecDeque::new(),
            dose: DoseAmount::default(),
            pending_confirm: None,
            with_background_color: ui_config.with_background_color,
            tick: 0,
        }
    }

    /// Re-projects the store and advances the animation tick.
    pub fn update(&mut self, store_state: &StoreState) {
        self.view = DashboardView::build(store_state, Instant::now());
        self.tick = self.tick.wrapping_add(1);
    }

    /// Add an event to activity logs with size limit
    pub fn add_to_activity_log(&mut self, event: WorkerEvent) {
        if self.activity_logs.len() >= MAX_ACTIVITY_LOGS {
            self.activity_logs.pop_front();
        }
        self.activity_logs.push_back(event);
    }

    /// Answers the open confirmation, if there is one.
    pub fn answer_confirm(&mut self, yes: bool) {
        if let Some(request) = self.pending_confirm.take() {
            request.answer(yes);
        }
    }
}
