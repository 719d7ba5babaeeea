//! Splash screen rendering module.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

pub const LOGO_NAME: &str = r#"
  ██████╗  ██╗   ██╗  █████╗  ██╗      ███████╗  █████╗  ██████╗  ███╗   ███╗
  ██╔══██╗ ██║   ██║ ██╔══██╗ ██║      ██╔════╝ ██╔══██╗ ██╔══██╗ ████╗ ████║
  ██║  ██║ ██║   ██║ ███████║ ██║      █████╗   ███████║ ██████╔╝ ██╔████╔██║
  ██║  ██║ ██║   ██║ ██╔══██║ ██║      ██╔══╝   ██╔══██║ ██╔══██╗ ██║╚██╔╝██║
  ██████╔╝ ╚██████╔╝ ██║  ██║ ███████╗ ██║      ██║  ██║ ██║  ██║ ██║ ╚═╝ ██║
  ╚═════╝   ╚═════╝  ╚═╝  ╚═╝ ╚══════╝ ╚═╝      ╚═╝  ╚═╝ ╚═╝  ╚═╝ ╚═╝     ╚═╝
"#;

/// Logo, version and the rig being connected to, centered on screen.
pub fn render_splash(f: &mut Frame, api_url: &str) {
    let logo_style = Style::default()
        .fg(Color::LightGreen)
        .add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = LOGO_NAME
        .trim_matches('\n')
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), logo_style)))
        .collect();

    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            format!("Rig monitor {}", env!("CARGO_PKG_VERSION")),
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::ITALIC),
        )),
        Line::from(Span::styled(
            format!("Connecting to {}", api_url),
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let height = lines.len() as u16;
    let area: Rect = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(f.area())[1];

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::NONE)),
        area,
    );
}
