// ABOUTME: Event handling system mapping keyboard, mouse and paste input to app actions

use crate::app::actions::ActionKind;
use crate::app::modal::is_backdrop_click;
use crate::app::state::InputMode;
use crate::app::AppState;
use crate::components::layout::{output_modal_area, terminal_modal_area};
use crate::terminal::input::encode_key;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Quit,
    ToggleHelp,
    NextRow,
    PreviousRow,
    GoToTop,
    GoToBottom,
    /// Toggle a category, or run the selected tool
    Activate,
    ToggleCategory,
    RunTool,
    InstallTool,
    ShowToolInfo,
    // Search events
    StartSearch,
    EndSearch,
    SearchInputChar(char),
    SearchBackspace,
    // Output modal events
    DismissModal,
    ScrollModalUp,
    ScrollModalDown,
    // Terminal modal events
    TerminalInput(String),
    TerminalScrollUp,
    TerminalScrollDown,
    CloseTerminal,
}

pub struct EventHandler;

impl EventHandler {
    pub fn handle_key_event(key_event: KeyEvent, state: &mut AppState) -> Option<AppEvent> {
        if key_event.kind == KeyEventKind::Release {
            return None;
        }

        // Terminal modal captures everything (highest priority)
        if state.terminal.is_visible() {
            return Self::handle_terminal_keys(key_event);
        }

        if state.output_modal.is_visible() {
            return match key_event.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Some(AppEvent::DismissModal),
                KeyCode::Char('j') | KeyCode::Down => Some(AppEvent::ScrollModalDown),
                KeyCode::Char('k') | KeyCode::Up => Some(AppEvent::ScrollModalUp),
                _ => None,
            };
        }

        if state.help_visible {
            return match key_event.code {
                KeyCode::Char('?') | KeyCode::Esc => Some(AppEvent::ToggleHelp),
                _ => None,
            };
        }

        if state.input_mode == InputMode::Search {
            return Self::handle_search_keys(key_event);
        }

        match key_event.code {
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => Some(AppEvent::Quit),
            KeyCode::Char('q') | KeyCode::Esc => Some(AppEvent::Quit),
            KeyCode::Char('?') => Some(AppEvent::ToggleHelp),
            KeyCode::Char('j') | KeyCode::Down => Some(AppEvent::NextRow),
            KeyCode::Char('k') | KeyCode::Up => Some(AppEvent::PreviousRow),
            KeyCode::Char('g') => Some(AppEvent::GoToTop),
            KeyCode::Char('G') => Some(AppEvent::GoToBottom),
            KeyCode::Enter => Some(AppEvent::Activate),
            KeyCode::Char(' ') => Some(AppEvent::ToggleCategory),
            KeyCode::Char('r') => Some(AppEvent::RunTool),
            KeyCode::Char('i') => Some(AppEvent::InstallTool),
            KeyCode::Char('o') => Some(AppEvent::ShowToolInfo),
            KeyCode::Char('/') => Some(AppEvent::StartSearch),
            _ => None,
        }
    }

    fn handle_search_keys(key_event: KeyEvent) -> Option<AppEvent> {
        match key_event.code {
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => Some(AppEvent::Quit),
            KeyCode::Esc | KeyCode::Enter => Some(AppEvent::EndSearch),
            KeyCode::Backspace => Some(AppEvent::SearchBackspace),
            KeyCode::Char(ch) => Some(AppEvent::SearchInputChar(ch)),
            _ => None,
        }
    }

    fn handle_terminal_keys(key_event: KeyEvent) -> Option<AppEvent> {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key_event.modifiers.contains(KeyModifiers::SHIFT);

        match key_event.code {
            // Legacy terminals report Ctrl+] as Ctrl+5
            KeyCode::Char(']' | '5') if ctrl => Some(AppEvent::CloseTerminal),
            KeyCode::PageUp if shift => Some(AppEvent::TerminalScrollUp),
            KeyCode::PageDown if shift => Some(AppEvent::TerminalScrollDown),
            _ => encode_key(key_event).map(AppEvent::TerminalInput),
        }
    }

    pub fn handle_mouse_event(mouse_event: MouseEvent, state: &AppState) -> Option<AppEvent> {
        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let (column, row) = (mouse_event.column, mouse_event.row);
                if state.terminal.is_visible() {
                    is_backdrop_click(terminal_modal_area(state.screen), column, row)
                        .then_some(AppEvent::CloseTerminal)
                } else if state.output_modal.is_visible() {
                    is_backdrop_click(output_modal_area(state.screen), column, row)
                        .then_some(AppEvent::DismissModal)
                } else {
                    None
                }
            }
            MouseEventKind::ScrollUp if state.terminal.is_visible() => Some(AppEvent::TerminalScrollUp),
            MouseEventKind::ScrollDown if state.terminal.is_visible() => Some(AppEvent::TerminalScrollDown),
            MouseEventKind::ScrollUp if state.output_modal.is_visible() => Some(AppEvent::ScrollModalUp),
            MouseEventKind::ScrollDown if state.output_modal.is_visible() => Some(AppEvent::ScrollModalDown),
            _ => None,
        }
    }

    pub fn handle_paste(text: String, state: &AppState) -> Vec<AppEvent> {
        if state.terminal.is_visible() {
            return vec![AppEvent::TerminalInput(text)];
        }
        if state.input_mode == InputMode::Search && !state.output_modal.is_visible() {
            return text
                .chars()
                .filter(|c| !c.is_control())
                .map(AppEvent::SearchInputChar)
                .collect();
        }
        Vec::new()
    }

    pub fn process_event(event: AppEvent, state: &mut AppState) {
        match event {
            AppEvent::Quit => state.quit(),
            AppEvent::ToggleHelp => state.toggle_help(),
            AppEvent::NextRow => state.next_row(),
            AppEvent::PreviousRow => state.previous_row(),
            AppEvent::GoToTop => state.first_row(),
            AppEvent::GoToBottom => state.last_row(),
            AppEvent::Activate => state.activate_selected(),
            AppEvent::ToggleCategory => state.toggle_selected_category(),
            AppEvent::RunTool => state.request_selected(ActionKind::RunInteractive),
            AppEvent::InstallTool => state.request_selected(ActionKind::Install),
            AppEvent::ShowToolInfo => state.request_selected(ActionKind::Info),
            AppEvent::StartSearch => state.start_search(),
            AppEvent::EndSearch => state.end_search(),
            AppEvent::SearchInputChar(ch) => state.search_push(ch),
            AppEvent::SearchBackspace => state.search_pop(),
            AppEvent::DismissModal => state.output_modal.dismiss(),
            AppEvent::ScrollModalUp => state.output_modal.scroll_up(1),
            AppEvent::ScrollModalDown => state.output_modal.scroll_down(1),
            AppEvent::TerminalInput(input) => {
                state.terminal.send_input(&input);
            }
            AppEvent::TerminalScrollUp => {
                if let Some(display) = state.terminal.display_mut() {
                    display.scroll_up(3);
                }
            }
            AppEvent::TerminalScrollDown => {
                if let Some(display) = state.terminal.display_mut() {
                    display.scroll_down(3);
                }
            }
            AppEvent::CloseTerminal => state.terminal.close(),
        }
    }
}
