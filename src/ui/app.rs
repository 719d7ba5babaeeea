//! Main application state and UI loop
//!
//! Contains the App struct and main UI event handling logic

use crate::api::PumpState;
use crate::confirm::ConfirmRequest;
use crate::consts::cli_consts::{DEFAULT_USER, polling};
use crate::environment::Environment;
use crate::events::Event as WorkerEvent;
use crate::store::DashboardStore;
use crate::ui::dashboard::{DashboardState, render_dashboard};
use crate::ui::splash::render_splash;
use crate::workers::{CommandDispatcher, ReportController};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Frame, Terminal, backend::Backend};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

const SPLASH_DURATION: Duration = Duration::from_secs(2);

/// UI configuration data grouped by concern
#[derive(Debug, Clone)]
pub struct UIConfig {
    pub with_background_color: bool,
    /// Operator name shown in the controls panel.
    pub user: String,
    pub poll_interval: Duration,
}

impl UIConfig {
    pub fn new(with_background_color: bool, user: String, poll_interval: Duration) -> Self {
        Self {
            with_background_color,
            user,
            poll_interval,
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        Self::new(false, DEFAULT_USER.to_string(), polling::poll_interval())
    }
}

/// The different screens in the application.
#[derive(Debug)]
pub enum Screen {
    /// Splash screen shown at the start of the application.
    Splash,
    /// Live rig dashboard.
    Dashboard(Box<DashboardState>),
}

/// Application state
pub struct App {
    start_time: Instant,
    environment: Environment,
    current_screen: Screen,
    store: DashboardStore,
    dispatcher: CommandDispatcher,
    reports: ReportController,
    /// Receives events from the workers.
    event_receiver: mpsc::Receiver<WorkerEvent>,
    /// Receives questions from the dispatcher.
    confirm_receiver: mpsc::Receiver<ConfirmRequest>,
    /// Broadcasts shutdown signal to the session.
    shutdown_sender: broadcast::Sender<()>,
    ui_config: UIConfig,
}

impl App {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        environment: Environment,
        store: DashboardStore,
        dispatcher: CommandDispatcher,
        reports: ReportController,
        event_receiver: mpsc::Receiver<WorkerEvent>,
        confirm_receiver: mpsc::Receiver<ConfirmRequest>,
        shutdown_sender: broadcast::Sender<()>,
        ui_config: UIConfig,
    ) -> Self {
        Self {
            start_time: Instant::now(),
            environment,
            current_screen: Screen::Splash,
            store,
            dispatcher,
            reports,
            event_receiver,
            confirm_receiver,
            shutdown_sender,
            ui_config,
        }
    }

    fn show_dashboard(&mut self) {
        let state = DashboardState::new(
            self.environment.clone(),
            self.start_time,
            &self.store.state(),
            self.ui_config.clone(),
        );
        self.current_screen = Screen::Dashboard(Box::new(state));
    }

    /// Moves worker events into the activity log and surfaces the next question.
    fn drain_background(&mut self) {
        let Screen::Dashboard(state) = &mut self.current_screen else {
            return;
        };
        while let Ok(event) = self.event_receiver.try_recv() {
            state.add_to_activity_log(event);
        }
        if state.pending_confirm.is_none() {
            if let Ok(request) = self.confirm_receiver.try_recv() {
                state.pending_confirm = Some(request);
            }
        }
    }

    /// Handles one key press. Returns true when the application should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        let state = match &mut self.current_screen {
            Screen::Splash => {
                // Any key other than quit skips the splash screen
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                    return true;
                }
                self.show_dashboard();
                return false;
            }
            Screen::Dashboard(state) => state,
        };

        if state.pending_confirm.is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => state.answer_confirm(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    state.answer_confirm(false)
                }
                KeyCode::Char('q') => return true,
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Char('o') => {
                let dispatcher = self.dispatcher.clone();
                tokio::spawn(async move {
                    let _ = dispatcher.set_pump(PumpState::On).await;
                });
            }
            KeyCode::Char('f') => {
                let dispatcher = self.dispatcher.clone();
                tokio::spawn(async move {
                    let _ = dispatcher.set_pump(PumpState::Off).await;
                });
            }
            KeyCode::Char('+') | KeyCode::Char('=') => state.dose = state.dose.increase(),
            KeyCode::Char('-') => state.dose = state.dose.decrease(),
            KeyCode::Char('d') => {
                let dispatcher = self.dispatcher.clone();
                let amount = state.dose.ml();
                tokio::spawn(async move {
                    let _ = dispatcher.dose(amount).await;
                });
            }
            KeyCode::Char('s') => {
                let dispatcher = self.dispatcher.clone();
                tokio::spawn(async move {
                    let _ = dispatcher.toggle_simulator().await;
                });
            }
            KeyCode::Char('r') => {
                let reports = self.reports.clone();
                tokio::spawn(async move {
                    let _ = reports.generate_report().await;
                });
            }
            KeyCode::Char('e') => {
                drop(self.reports.export_csv());
            }
            _ => {}
        }
        false
    }

    #[cfg(test)]
    fn pending_prompt(&self) -> Option<&str> {
        match &self.current_screen {
            Screen::Dashboard(state) => state.pending_confirm.as_ref().map(|r| r.prompt.as_str()),
            Screen::Splash => None,
        }
    }
}

/// Runs the application UI in a loop, handling events and rendering the appropriate screen.
pub async fn run<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> std::io::Result<()> {
    let splash_start = Instant::now();

    loop {
        app.drain_background();

        if let Screen::Dashboard(state) = &mut app.current_screen {
            state.update(&app.store.state());
        }
        terminal.draw(|f| render(f, &app.current_screen, &app.environment))?;

        if matches!(app.current_screen, Screen::Splash) && splash_start.elapsed() >= SPLASH_DURATION
        {
            app.show_dashboard();
            continue;
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Skip events that are not KeyEventKind::Press
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if app.handle_key(key) {
                    let _ = app.shutdown_sender.send(());
                    return Ok(());
                }
            }
        }
    }
}

/// Renders the current screen based on the application state.
fn render(f: &mut Frame, screen: &Screen, environment: &Environment) {
    match screen {
        Screen::Splash => render_splash(f, &environment.api_url()),
        Screen::Dashboard(state) => render_dashboard(f, state),
    }
}
