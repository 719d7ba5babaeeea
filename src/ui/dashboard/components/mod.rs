//! Dashboard component modules
//!
//! Contains all individual rendering components

pub mod alerts;
pub mod confirm;
pub mod controls;
pub mod footer;
pub mod header;
pub mod kpi;
pub mod logs;
pub mod report;
