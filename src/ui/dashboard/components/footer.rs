//! Dashboard footer component
//!
//! Renders the key bindings, or the modal's answers while a confirmation is open

use super::super::state::DashboardState;
use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

pub fn render_footer(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let footer_text = if state.pending_confirm.is_some() {
        "[Y] Yes | [N] No"
    } else {
        "[O] Pump on | [F] Pump off | [+/-] Dose amount | [D] Dose | [S] Simulator | [R] Report | [E] Export CSV | [Q] Quit"
    };

    let footer = Paragraph::new(footer_text)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_type(BorderType::Thick),
        );
    f.render_widget(footer, area);
}
