//! Unified messaging system for session operations

// ANSI Color Codes for session messages
pub const COLOR_INFO: &str = "\x1b[1;36m"; // Bold Cyan
pub const COLOR_SUCCESS: &str = "\x1b[1;32m"; // Bold Green
pub const COLOR_RESET: &str = "\x1b[0m";

/// Session-specific message types
#[derive(Debug, Clone)]
pub enum SessionMessage {
    Info(String),
    Success(String),
}

impl SessionMessage {
    pub fn print(&self) {
        match self {
            Self::Info(msg) => println!("{}[INFO]{} {}", COLOR_INFO, COLOR_RESET, msg),
            Self::Success(msg) => println!("{}[SUCCESS]{} {}", COLOR_SUCCESS, COLOR_RESET, msg),
        }
    }
}

pub fn print_session_starting(mode: &str, api_url: &str, user: &str) {
    SessionMessage::Info(format!(
        "Starting {} mode against {} as {}",
        mode, api_url, user
    ))
    .print();
}

pub fn print_session_shutdown() {
    SessionMessage::Info("Stopping telemetry polling...".to_string()).print();
}

pub fn print_session_exit_success() {
    SessionMessage::Success("DualFarm monitor exited cleanly".to_string()).print();
}
