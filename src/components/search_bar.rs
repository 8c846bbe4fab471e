// ABOUTME: Search bar component showing the live tool filter

use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{AppState, InputMode};

pub struct SearchBarComponent;

impl SearchBarComponent {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let searching = state.input_mode == InputMode::Search;

        let line = if searching {
            Line::from(vec![
                Span::styled("/ ", Style::default().fg(Color::Yellow)),
                Span::raw(state.search_query.clone()),
                Span::styled("█", Style::default().fg(Color::Yellow)),
            ])
        } else if state.search_query.is_empty() {
            Line::from(Span::styled(
                "Press / to search tools",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(vec![
                Span::styled("/ ", Style::default().fg(Color::Gray)),
                Span::raw(state.search_query.clone()),
            ])
        };

        let border_color = if searching { Color::Yellow } else { Color::Cyan };
        let bar = Paragraph::new(line).block(
            Block::default()
                .title("Search")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );

        frame.render_widget(bar, area);
    }
}

impl Default for SearchBarComponent {
    fn default() -> Self {
        Self::new()
    }
}
