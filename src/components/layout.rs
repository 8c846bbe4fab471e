// ABOUTME: Main layout component arranging search bar, tool list, menu bar and overlays
// Also owns the modal geometry shared by rendering, hit testing and terminal sizing

use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use super::{
    HelpComponent, OutputModalComponent, SearchBarComponent, SpinnerComponent,
    TerminalModalComponent, ToolListComponent,
};
use crate::app::AppState;

pub struct LayoutComponent {
    search_bar: SearchBarComponent,
    tool_list: ToolListComponent,
    help: HelpComponent,
    spinner: SpinnerComponent,
    output_modal: OutputModalComponent,
    terminal_modal: TerminalModalComponent,
}

impl LayoutComponent {
    pub fn new() -> Self {
        Self {
            search_bar: SearchBarComponent::new(),
            tool_list: ToolListComponent::new(),
            help: HelpComponent::new(),
            spinner: SpinnerComponent::new(),
            output_modal: OutputModalComponent::new(),
            terminal_modal: TerminalModalComponent::new(),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, state: &AppState) {
        let screen = frame.size();
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar
                Constraint::Min(0),    // Tool list
                Constraint::Length(3), // Bottom menu bar
            ])
            .split(screen);

        self.search_bar.render(frame, main_chunks[0], state);
        self.tool_list.render(frame, main_chunks[1], state);
        self.render_menu_bar(frame, main_chunks[2]);

        if state.help_visible {
            self.help.render(frame, screen);
        }

        if state.spinner_visible {
            self.spinner.render(frame, screen);
        }

        if state.output_modal.is_visible() {
            self.output_modal.render(frame, output_modal_area(screen), state);
        }

        // Terminal sits above everything else
        if state.terminal.is_visible() {
            self.terminal_modal.render(frame, terminal_modal_area(screen), state);
        }
    }

    fn render_menu_bar(&self, frame: &mut Frame, area: Rect) {
        let menu_text = "[enter]open/run [r]un [i]nstall [o]info [/]search [?]help [q]uit";

        let menu = Paragraph::new(menu_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center);

        frame.render_widget(menu, area);
    }
}

impl Default for LayoutComponent {
    fn default() -> Self {
        Self::new()
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn output_modal_area(screen: Rect) -> Rect {
    centered_rect(70, 70, screen)
}

pub fn terminal_modal_area(screen: Rect) -> Rect {
    centered_rect(90, 90, screen)
}

/// Cells inside the terminal modal's border, above its one-line footer
pub fn terminal_content_area(screen: Rect) -> Rect {
    let inner = Block::default()
        .borders(Borders::ALL)
        .inner(terminal_modal_area(screen));
    Rect {
        height: inner.height.saturating_sub(1),
        ..inner
    }
}
