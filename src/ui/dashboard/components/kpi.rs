//! KPI cards: TDS, temperature, water level and active alert count.

use super::super::state::DashboardState;
use super::super::utils::tone_color;
use super::super::view::Kpi;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

pub fn render_kpi_row(f: &mut Frame, area: Rect, state: &DashboardState) {
    let view = &state.view;
    let cards = [
        &view.tds,
        &view.temperature,
        &view.water_level,
        &view.active_alerts,
    ];
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (kpi, chunk) in cards.into_iter().zip(chunks.iter()) {
        render_kpi(f, *chunk, kpi);
    }
}

fn render_kpi(f: &mut Frame, area: Rect, kpi: &Kpi) {
    let color = tone_color(kpi.tone);
    let lines = vec![
        Line::from(Span::styled(
            kpi.value.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(kpi.status.clone(), Style::default().fg(color))),
        Line::from(Span::styled(
            format!("target {}", kpi.target),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(kpi.label)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}
