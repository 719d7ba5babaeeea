//! Report panel, showing the last generated report until a new one replaces it.

use super::super::state::DashboardState;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap};

pub fn render_report_panel(f: &mut Frame, area: Rect, state: &DashboardState) {
    let lines: Vec<Line> = match &state.view.report {
        Some(markdown) => markdown.lines().map(markdown_line).collect(),
        None => vec![Line::from(Span::styled(
            "No report yet. Press [R] to generate one.",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let block = Block::default()
        .title("REPORT")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1));

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

/// Headings stand out; everything else is shown verbatim.
fn markdown_line(line: &str) -> Line<'static> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        Line::from(Span::styled(
            trimmed.trim_start_matches('#').trim().to_string(),
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(line.to_string())
    }
}
