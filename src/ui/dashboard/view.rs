//! Dashboard view model
//!
//! A pure mapping from [`StoreState`] to everything the dashboard draws.
//! Components render a [`DashboardView`] and never look at the store directly.

use crate::api::{Alert, Severity};
use crate::consts::cli_consts::thresholds;
use crate::store::{StoreState, TdsStatus, classify_tds};
use tokio::time::Instant;

/// Shown in place of any numeric field before the first reading arrives.
pub const VALUE_PLACEHOLDER: &str = "--";
/// Shown in place of a status before the first reading arrives.
pub const STATUS_PLACEHOLDER: &str = "No data";

/// Colour band of a KPI card.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Good,
    Warning,
    Danger,
}

impl From<TdsStatus> for Tone {
    fn from(status: TdsStatus) -> Self {
        match status {
            TdsStatus::Unknown => Tone::Neutral,
            TdsStatus::Normal => Tone::Good,
            TdsStatus::Warning => Tone::Warning,
            TdsStatus::Danger => Tone::Danger,
        }
    }
}

/// How loudly an alert card is drawn. Ordered from quietest to loudest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Emphasis {
    Muted,
    Normal,
    Elevated,
    Critical,
}

impl From<&Severity> for Emphasis {
    fn from(severity: &Severity) -> Self {
        match severity {
            Severity::Critical => Emphasis::Critical,
            Severity::Warning => Emphasis::Elevated,
            Severity::Info => Emphasis::Normal,
            Severity::Unknown => Emphasis::Muted,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub label: &'static str,
    pub value: String,
    pub status: String,
    pub target: &'static str,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertCard {
    pub title: String,
    pub message: String,
    pub severity: String,
    pub time: String,
    pub emphasis: Emphasis,
}

impl AlertCard {
    fn from_alert(alert: &Alert) -> Self {
        Self {
            title: humanize_alert_type(&alert.alert_type),
            message: alert.message.clone(),
            severity: alert.severity.to_string().to_uppercase(),
            time: alert.timestamp.format("%H:%M:%S").to_string(),
            emphasis: Emphasis::from(&alert.severity),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub tds: Kpi,
    pub temperature: Kpi,
    pub water_level: Kpi,
    pub active_alerts: Kpi,
    pub pump: String,
    pub simulator_running: bool,
    pub simulator: String,
    pub alerts: Vec<AlertCard>,
    pub message: Option<String>,
    pub busy: bool,
    pub report: Option<String>,
    pub reading_time: String,
    pub last_updated: String,
}

/// `tds_high` → `TDS HIGH`.
pub fn humanize_alert_type(alert_type: &str) -> String {
    alert_type.replace('_', " ").to_uppercase()
}

impl DashboardView {
    pub fn build(state: &StoreState, now: Instant) -> Self {
        let reading = state.snapshot.reading.as_ref();
        let tds_status = classify_tds(reading.map(|r| r.tds_ppm));

        let tds = Kpi {
            label: "TDS",
            value: reading.map_or_else(placeholder, |r| format!("{:.0} ppm", r.tds_ppm)),
            status: match tds_status {
                TdsStatus::Unknown => STATUS_PLACEHOLDER.to_string(),
                status => status.to_string().to_uppercase(),
            },
            target: "500-1100 ppm",
            tone: tds_status.into(),
        };

        // Temperature and water level are display-only.
        let temperature = Kpi {
            label: "TEMPERATURE",
            value: reading.map_or_else(placeholder, |r| format!("{:.1} °C", r.temperature_c)),
            status: reading.map_or_else(no_data, |r| {
                in_range(
                    r.temperature_c >= thresholds::TEMP_MIN_C
                        && r.temperature_c <= thresholds::TEMP_MAX_C,
                )
            }),
            target: "15-35 °C",
            tone: Tone::Neutral,
        };

        let water_level = Kpi {
            label: "WATER LEVEL",
            value: reading.map_or_else(placeholder, |r| format!("{:.1} cm", r.water_level_cm)),
            status: reading.map_or_else(no_data, |r| {
                in_range(r.water_level_cm >= thresholds::WATER_LEVEL_MIN_CM)
            }),
            target: ">= 10 cm",
            tone: Tone::Neutral,
        };

        let alerts: Vec<AlertCard> = state
            .snapshot
            .alerts
            .iter()
            .map(AlertCard::from_alert)
            .collect();
        let active_alerts = Kpi {
            label: "ACTIVE ALERTS",
            value: alerts.len().to_string(),
            status: if alerts.is_empty() { "All clear" } else { "Attention" }.to_string(),
            target: "0",
            tone: if alerts.iter().any(|a| a.emphasis == Emphasis::Critical) {
                Tone::Danger
            } else if alerts.is_empty() {
                Tone::Good
            } else {
                Tone::Warning
            },
        };

        let simulator_running = state.snapshot.simulator.running;

        Self {
            tds,
            temperature,
            water_level,
            active_alerts,
            pump: reading.map_or_else(placeholder, |r| r.pump_state.to_string()),
            simulator_running,
            simulator: if simulator_running { "RUNNING" } else { "STOPPED" }.to_string(),
            alerts,
            message: state.ui.message_at(now).map(str::to_string),
            busy: state.ui.busy(),
            report: state.report.as_ref().map(|r| r.report_markdown.clone()),
            reading_time: reading.map_or_else(placeholder, |r| {
                r.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
            }),
            last_updated: state
                .last_updated
                .map_or_else(|| "Never".to_string(), |t| t.format("%H:%M:%S").to_string()),
        }
    }
}

fn placeholder() -> String {
    VALUE_PLACEHOLDER.to_string()
}

fn no_data() -> String {
    STATUS_PLACEHOLDER.to_string()
}

fn in_range(ok: bool) -> String {
    if ok { "In range" } else { "Out of range" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures;

    #[test]
    fn empty_state_renders_placeholders() {
        let view = DashboardView::build(&StoreState::default(), Instant::now());
        assert_eq!(view.tds.value, VALUE_PLACEHOLDER);
        assert_eq!(view.tds.status, STATUS_PLACEHOLDER);
        assert_eq!(view.tds.tone, Tone::Neutral);
        assert_eq!(view.temperature.value, VALUE_PLACEHOLDER);
        assert_eq!(view.water_level.status, STATUS_PLACEHOLDER);
        assert_eq!(view.pump, VALUE_PLACEHOLDER);
        assert_eq!(view.last_updated, "Never");
        assert!(view.alerts.is_empty());
        assert!(view.message.is_none());
    }

    #[test]
    fn reading_fills_kpis() {
        let mut state = StoreState::default();
        state.snapshot = fixtures::snapshot(1050.0, true);
        let view = DashboardView::build(&state, Instant::now());
        assert_eq!(view.tds.value, "1050 ppm");
        assert_eq!(view.tds.status, "WARNING");
        assert_eq!(view.tds.tone, Tone::Warning);
        assert_eq!(view.temperature.value, "24.5 °C");
        assert_eq!(view.temperature.status, "In range");
        assert_eq!(view.pump, "OFF");
        assert_eq!(view.simulator, "RUNNING");
    }

    #[test]
    fn alert_types_are_humanized() {
        assert_eq!(humanize_alert_type("tds_high"), "TDS HIGH");
        assert_eq!(humanize_alert_type("water_level_low"), "WATER LEVEL LOW");
        assert_eq!(humanize_alert_type("pump"), "PUMP");
    }

    #[test]
    fn critical_is_strictly_loudest() {
        for severity in [Severity::Warning, Severity::Info, Severity::Unknown] {
            assert!(Emphasis::from(&Severity::Critical) > Emphasis::from(&severity));
        }
    }

    #[test]
    fn critical_alert_turns_alert_kpi_red() {
        let mut state = StoreState::default();
        state.snapshot.alerts = vec![
            fixtures::alert(1, "temp_high", Severity::Warning),
            fixtures::alert(2, "tds_low", Severity::Critical),
        ];
        let view = DashboardView::build(&state, Instant::now());
        assert_eq!(view.active_alerts.value, "2");
        assert_eq!(view.active_alerts.tone, Tone::Danger);
        assert_eq!(view.alerts[1].title, "TDS LOW");
        assert_eq!(view.alerts[1].severity, "CRITICAL");
        assert_eq!(view.alerts[1].emphasis, Emphasis::Critical);
    }
}
