// ABOUTME: Interactive terminal modal rendering the relayed tool session

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::AppState;
use crate::terminal::RelayState;

pub struct TerminalModalComponent;

impl TerminalModalComponent {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let relay = &state.terminal;
        frame.render_widget(Clear, area);

        let (status_text, status_color) = match relay.state() {
            RelayState::Opening => ("connecting", Color::Yellow),
            RelayState::Active => ("connected", Color::Green),
            RelayState::Disconnected => ("disconnected", Color::Red),
            RelayState::Idle | RelayState::Closed => ("closed", Color::Gray),
        };

        let block = Block::default()
            .title(Line::from(vec![
                Span::styled(
                    format!(" {} ", relay.title()),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("[{status_text}] "), Style::default().fg(status_color)),
            ]))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(status_color));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        if let Some(display) = relay.display() {
            frame.render_widget(display, chunks[0]);
        }

        let hint = Paragraph::new("[ctrl+]] close  [shift+pgup/pgdn] scroll")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(hint, chunks[1]);
    }
}

impl Default for TerminalModalComponent {
    fn default() -> Self {
        Self::new()
    }
}
