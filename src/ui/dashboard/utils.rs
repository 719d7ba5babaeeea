//! Dashboard utility functions
//!
//! Contains helper functions used across dashboard components

use super::view::{Emphasis, Tone};
use crate::events::Worker;
use ratatui::prelude::{Color, Modifier, Style};

/// Get a ratatui color for a worker based on its type
pub fn get_worker_color(worker: &Worker) -> Color {
    match worker {
        Worker::Poller => Color::Cyan,
        Worker::Dispatcher => Color::Yellow,
        Worker::Reports => Color::Green,
    }
}

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Neutral => Color::LightBlue,
        Tone::Good => Color::LightGreen,
        Tone::Warning => Color::LightYellow,
        Tone::Danger => Color::LightRed,
    }
}

/// Border and title style of an alert card.
pub fn emphasis_style(emphasis: Emphasis) -> Style {
    match emphasis {
        Emphasis::Critical => Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
        Emphasis::Elevated => Style::default()
            .fg(Color::LightYellow)
            .add_modifier(Modifier::BOLD),
        Emphasis::Normal => Style::default().fg(Color::LightBlue),
        Emphasis::Muted => Style::default().fg(Color::DarkGray),
    }
}

/// Format compact timestamp with date and time from full timestamp
pub fn format_compact_timestamp(timestamp: &str) -> String {
    // "YYYY-MM-DD HH:MM:SS" -> "MM-DD HH:MM:SS"
    let mut parts = timestamp.split(' ');
    match (parts.next().and_then(|d| d.get(5..10)), parts.next()) {
        (Some(month_day), Some(time)) => format!("{} {}", month_day, time),
        _ => timestamp.to_string(),
    }
}

/// Shorten transport errors for the activity log
pub fn clean_http_error_message(msg: &str) -> String {
    if !msg.contains("Reqwest error") {
        return msg.to_string();
    }
    let prefix = msg.split(": Reqwest error").next().unwrap_or(msg);
    if msg.contains("timed out") {
        format!("{}: rig timed out", prefix)
    } else if msg.contains("connect") {
        format!("{}: rig unreachable", prefix)
    } else {
        format!("{}: network error", prefix)
    }
}
