//! TUI mode execution

use super::{
    SessionData,
    messages::{print_session_exit_success, print_session_shutdown, print_session_starting},
};
use crate::ui::{self, UIConfig};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{error::Error, io};
use tokio::sync::mpsc;

/// Runs the dashboard until the operator quits, then stops polling.
pub async fn run_tui_mode(
    mut session: SessionData,
    with_background: bool,
) -> Result<(), Box<dyn Error>> {
    print_session_starting(
        "dashboard",
        &session.environment.api_url(),
        &session.worker_config.user,
    );

    // Auto-confirming sessions never ask, so an idle channel stands in.
    let confirm_receiver = session
        .confirm_receiver
        .take()
        .unwrap_or_else(|| mpsc::channel(1).1);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let ui_config = UIConfig::new(
        with_background,
        session.worker_config.user.clone(),
        session.worker_config.poll_interval,
    );
    let app = ui::App::new(
        session.environment.clone(),
        session.store.clone(),
        session.dispatcher.clone(),
        session.reports.clone(),
        session.event_receiver,
        confirm_receiver,
        session.shutdown_sender.clone(),
        ui_config,
    );

    let result = ui::run(&mut terminal, app).await;

    // Clean up the terminal after running the application
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;

    print_session_shutdown();
    session.poller.shutdown().await;
    print_session_exit_success();

    Ok(())
}
