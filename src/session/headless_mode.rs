//! Headless mode execution

use super::{
    SessionData,
    messages::{print_session_exit_success, print_session_shutdown, print_session_starting},
};
use crate::store::{Snapshot, classify_tds};
use std::error::Error;

/// One status line per snapshot, e.g. `TDS 820 ppm (normal) | 24.5 °C | 30.0 cm | pump ON | sim running | 1 alert(s)`.
pub fn status_line(snapshot: &Snapshot) -> String {
    let simulator = if snapshot.simulator.running {
        "running"
    } else {
        "stopped"
    };
    match &snapshot.reading {
        Some(r) => format!(
            "TDS {:.0} ppm ({}) | {:.1} °C | {:.1} cm | pump {} | sim {} | {} alert(s)",
            r.tds_ppm,
            classify_tds(Some(r.tds_ppm)),
            r.temperature_c,
            r.water_level_cm,
            r.pump_state,
            simulator,
            snapshot.alerts.len()
        ),
        None => format!(
            "No reading yet | sim {} | {} alert(s)",
            simulator,
            snapshot.alerts.len()
        ),
    }
}

/// Streams activity events and snapshot changes to stdout until Ctrl+C.
pub async fn run_headless_mode(mut session: SessionData) -> Result<(), Box<dyn Error>> {
    print_session_starting(
        "headless",
        &session.environment.api_url(),
        &session.worker_config.user,
    );

    // Trigger shutdown on Ctrl+C
    let shutdown_sender_clone = session.shutdown_sender.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_sender_clone.send(());
        }
    });

    let mut shutdown_receiver = session.shutdown_sender.subscribe();
    let mut store_changes = session.store.subscribe();

    loop {
        tokio::select! {
            Some(event) = session.event_receiver.recv() => {
                if event.should_display() {
                    println!("{}", event);
                }
            }
            Ok(()) = store_changes.changed() => {
                let snapshot = store_changes.borrow_and_update().snapshot.clone();
                println!("{}", status_line(&snapshot));
            }
            _ = shutdown_receiver.recv() => {
                break;
            }
        }
    }

    print_session_shutdown();
    session.poller.shutdown().await;
    print_session_exit_success();

    Ok(())
}
