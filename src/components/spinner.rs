// ABOUTME: Busy indicator shown while a tool request is in flight

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
};

pub struct SpinnerComponent;

impl SpinnerComponent {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, screen: Rect) {
        let width = 24.min(screen.width);
        let height = 3.min(screen.height);
        let area = Rect::new(
            screen.x + (screen.width - width) / 2,
            screen.y + (screen.height - height) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, area);
        let spinner = Paragraph::new("⏳ Working...")
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            );
        frame.render_widget(spinner, area);
    }
}

impl Default for SpinnerComponent {
    fn default() -> Self {
        Self::new()
    }
}
