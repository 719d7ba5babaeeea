//! Controls panel: actuator state, simulator state and the dose input.

use super::super::state::DashboardState;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph};

pub fn render_controls_panel(f: &mut Frame, area: Rect, state: &DashboardState) {
    let view = &state.view;

    let pump_color = match view.pump.as_str() {
        "ON" => Color::LightGreen,
        "OFF" => Color::LightRed,
        _ => Color::Gray,
    };
    let simulator_color = if view.simulator_running {
        Color::LightGreen
    } else {
        Color::Gray
    };

    let row = |label: &str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(format!("{:<11}", label), Style::default().fg(Color::Gray)),
            Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ])
    };

    let lines = vec![
        row("Pump", view.pump.clone(), pump_color),
        row("Simulator", view.simulator.clone(), simulator_color),
        row("Dose", state.dose.to_string(), Color::LightCyan),
        row("Reading", view.reading_time.clone(), Color::White),
        row("Operator", state.user.clone(), Color::White),
    ];

    let block = Block::default()
        .title("CONTROLS")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1));

    f.render_widget(Paragraph::new(lines).block(block), area);
}
