// ABOUTME: Output modal component rendering install results, run failures and tool info
// The body may carry ANSI colour codes from the server and is rendered with them

use ansi_to_tui::IntoText;
use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::modal::ModalStatus;
use crate::app::AppState;

pub struct OutputModalComponent;

impl OutputModalComponent {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let modal = &state.output_modal;
        frame.render_widget(Clear, area);

        let (status_color, border_color) = match modal.status {
            ModalStatus::Success => (Color::Green, Color::Green),
            ModalStatus::Error => (Color::Red, Color::Red),
        };

        let block = Block::default()
            .title(format!(" {} ", modal.title))
            .title_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Status line
                Constraint::Min(0),    // Body
                Constraint::Length(1), // Hint
            ])
            .split(inner);

        let status = Paragraph::new(modal.status_message.clone())
            .style(Style::default().fg(status_color).add_modifier(Modifier::BOLD))
            .wrap(Wrap { trim: true });
        frame.render_widget(status, chunks[0]);

        let body_text = modal
            .body
            .as_bytes()
            .into_text()
            .unwrap_or_else(|_| Text::raw(modal.body.clone()));
        let body = Paragraph::new(body_text)
            .wrap(Wrap { trim: false })
            .scroll((modal.scroll, 0));
        frame.render_widget(body, chunks[1]);

        let hint = Paragraph::new("[esc] close  [j/k] scroll")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(hint, chunks[2]);
    }
}

impl Default for OutputModalComponent {
    fn default() -> Self {
        Self::new()
    }
}
