//! Dashboard header component
//!
//! Renders the title, connection details and the transient message banner

use super::super::state::DashboardState;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Render header with title, rig details and the message banner.
pub fn render_header(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let header_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let title = Paragraph::new(format!(
        "DUALFARM RIG MONITOR v{}",
        env!("CARGO_PKG_VERSION")
    ))
    .alignment(Alignment::Center)
    .style(
        Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD),
    )
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_type(BorderType::Thick),
    );
    f.render_widget(title, header_chunks[0]);

    let view = &state.view;
    let mut spans = vec![
        Span::styled(
            format!("{} ", state.environment.api_url()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("| Updated {} ", view.last_updated),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("| every {}s ", state.poll_interval.as_secs_f32()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if view.busy {
        spans.push(Span::styled(
            format!("| {} sending ", SPINNER[state.tick % SPINNER.len()]),
            Style::default().fg(Color::LightYellow),
        ));
    }
    if let Some(message) = &view.message {
        spans.push(Span::styled(
            format!("| {}", message),
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightYellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let status = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(status, header_chunks[1]);
}
