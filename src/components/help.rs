// ABOUTME: Help overlay component displaying keyboard shortcuts and commands

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem},
};

use super::layout::centered_rect;

pub struct HelpComponent;

impl HelpComponent {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 80, area);

        frame.render_widget(Clear, popup_area);

        let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        let help_items = vec![
            ListItem::new("Navigation:").style(heading),
            ListItem::new("  j/↓        Move down"),
            ListItem::new("  k/↑        Move up"),
            ListItem::new("  g          Go to top"),
            ListItem::new("  G          Go to bottom"),
            ListItem::new("  Space      Expand/collapse category"),
            ListItem::new(""),
            ListItem::new("Tool Actions:").style(heading),
            ListItem::new("  Enter      Open category / run tool"),
            ListItem::new("  r          Run tool in terminal"),
            ListItem::new("  i          Install tool"),
            ListItem::new("  o          Show tool info"),
            ListItem::new("  /          Search tools"),
            ListItem::new(""),
            ListItem::new("Terminal:").style(heading),
            ListItem::new("  Ctrl+]     Close terminal"),
            ListItem::new("  Shift+PgUp Scroll back"),
            ListItem::new(""),
            ListItem::new("General:").style(heading),
            ListItem::new("  ?          Toggle this help"),
            ListItem::new("  q/Esc      Quit application"),
            ListItem::new("  Ctrl+C     Force quit"),
        ];

        let help_list = List::new(help_items).block(
            Block::default()
                .title("Help - Press ? or Esc to close")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

        frame.render_widget(help_list, popup_area);
    }
}

impl Default for HelpComponent {
    fn default() -> Self {
        Self::new()
    }
}
