//! Active alerts panel

use super::super::state::DashboardState;
use super::super::utils::emphasis_style;
use super::super::view::Emphasis;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap};

pub fn render_alerts_panel(f: &mut Frame, area: Rect, state: &DashboardState) {
    let alerts = &state.view.alerts;

    let lines: Vec<Line> = if alerts.is_empty() {
        vec![Line::from(Span::styled(
            "No active alerts",
            Style::default().fg(Color::LightGreen),
        ))]
    } else {
        alerts
            .iter()
            .flat_map(|card| {
                let marker = if card.emphasis == Emphasis::Critical {
                    "!! "
                } else {
                    "•  "
                };
                [
                    Line::from(vec![
                        Span::styled(
                            format!("{}{} [{}]", marker, card.title, card.severity),
                            emphasis_style(card.emphasis),
                        ),
                        Span::styled(
                            format!(" {}", card.time),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]),
                    Line::from(Span::raw(format!("   {}", card.message))),
                ]
            })
            .collect()
    };

    let border_color = if alerts.iter().any(|a| a.emphasis == Emphasis::Critical) {
        Color::Red
    } else {
        Color::Cyan
    };
    let block = Block::default()
        .title(format!("ALERTS ({})", alerts.len()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .padding(Padding::horizontal(1));

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
