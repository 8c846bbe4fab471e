// ABOUTME: Application state for the tool dashboard and the controller that drives it
// Owns panels, search, modals, the terminal relay, and the in-flight request plumbing

use crate::api::{ToolApiClient, ToolRequest};
use crate::app::actions::{terminal_open_failure, ActionKind, ActionOutcome, Resolution, ToolAction};
use crate::app::modal::{ModalContent, OutputModal};
use crate::app::panels::{toggle_category, CategoryPanel};
use crate::app::search;
use crate::components::layout::terminal_content_area;
use crate::config::AppConfig;
use crate::models::{Catalog, ToolEntry};
use crate::terminal::{ChannelConnector, SocketIoConnector, TerminalRelay};
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Search,
}

/// One line of the tool list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRow {
    Category(usize),
    /// Index into `AppState::entries`
    Tool(usize),
}

pub struct AppState {
    pub catalog: Catalog,
    pub panels: Vec<CategoryPanel>,
    pub entries: Vec<ToolEntry>,
    pub search_query: String,
    pub input_mode: InputMode,
    pub selected_row: usize,
    pub spinner_visible: bool,
    pub output_modal: OutputModal,
    pub terminal: TerminalRelay,
    pub help_visible: bool,
    pub should_quit: bool,
    /// Request chosen by the user, sent on the next tick
    pub pending_action: Option<ToolAction>,
    /// Size of the last drawn frame
    pub screen: Rect,
}

impl AppState {
    pub fn new(catalog: Catalog, terminal: TerminalRelay) -> Self {
        let panels = catalog
            .categories
            .iter()
            .map(|c| CategoryPanel::new(c.title.clone(), c.description.clone()))
            .collect();
        let entries = catalog.entries();

        let mut state = Self {
            catalog,
            panels,
            entries,
            search_query: String::new(),
            input_mode: InputMode::Browse,
            selected_row: 0,
            spinner_visible: false,
            output_modal: OutputModal::new(),
            terminal,
            help_visible: false,
            should_quit: false,
            pending_action: None,
            screen: Rect::default(),
        };

        // First category starts open
        if !state.panels.is_empty() {
            state.toggle_category(0);
        }
        state
    }

    pub fn rows(&self) -> Vec<ListRow> {
        let mut rows = Vec::new();
        for (category_idx, panel) in self.panels.iter().enumerate() {
            rows.push(ListRow::Category(category_idx));
            if !panel.is_expanded() {
                continue;
            }
            rows.extend(
                self.entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.category_idx == category_idx && e.visible)
                    .map(|(entry_idx, _)| ListRow::Tool(entry_idx)),
            );
        }
        rows
    }

    pub fn selected(&self) -> Option<ListRow> {
        self.rows().get(self.selected_row).copied()
    }

    pub fn selected_entry(&self) -> Option<&ToolEntry> {
        match self.selected()? {
            ListRow::Tool(entry_idx) => self.entries.get(entry_idx),
            ListRow::Category(_) => None,
        }
    }

    pub fn toggle_category(&mut self, index: usize) -> Option<bool> {
        let expanded = toggle_category(&mut self.panels, index);
        self.clamp_selection();
        expanded
    }

    /// Enter on a category toggles it; on a tool it runs the tool
    pub fn activate_selected(&mut self) {
        match self.selected() {
            Some(ListRow::Category(idx)) => {
                self.toggle_category(idx);
            }
            Some(ListRow::Tool(_)) => self.request_selected(ActionKind::RunInteractive),
            None => {}
        }
    }

    pub fn toggle_selected_category(&mut self) {
        let category = match self.selected() {
            Some(ListRow::Category(idx)) => Some(idx),
            Some(ListRow::Tool(entry_idx)) => self.entries.get(entry_idx).map(|e| e.category_idx),
            None => None,
        };
        if let Some(idx) = category {
            self.toggle_category(idx);
            // Keep the cursor on the header that was toggled
            if let Some(pos) = self.rows().iter().position(|r| *r == ListRow::Category(idx)) {
                self.selected_row = pos;
            }
        }
    }

    pub fn next_row(&mut self) {
        let len = self.rows().len();
        if len > 0 {
            self.selected_row = (self.selected_row + 1) % len;
        }
    }

    pub fn previous_row(&mut self) {
        let len = self.rows().len();
        if len > 0 {
            self.selected_row = if self.selected_row == 0 {
                len - 1
            } else {
                self.selected_row - 1
            };
        }
    }

    pub fn first_row(&mut self) {
        self.selected_row = 0;
    }

    pub fn last_row(&mut self) {
        self.selected_row = self.rows().len().saturating_sub(1);
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn end_search(&mut self) {
        self.input_mode = InputMode::Browse;
    }

    pub fn search_push(&mut self, ch: char) {
        self.search_query.push(ch);
        self.apply_search();
    }

    pub fn search_pop(&mut self) {
        self.search_query.pop();
        self.apply_search();
    }

    pub fn apply_search(&mut self) -> usize {
        let shown = search::apply(&self.search_query, &mut self.entries);
        debug!("Search {:?} shows {} tools", self.search_query, shown);
        self.clamp_selection();
        shown
    }

    /// Queue a request for the selected tool. Install and run are only
    /// offered for tools that have them.
    pub fn request_selected(&mut self, kind: ActionKind) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        let Some(tool) = self.catalog.tool(entry.category_idx, entry.tool_idx) else {
            warn!("No catalog tool behind entry {}", entry.name);
            return;
        };
        let available = match kind {
            ActionKind::Install => tool.has_install(),
            ActionKind::RunInteractive => tool.has_run(),
            ActionKind::Info => true,
        };
        if !available {
            debug!("{:?} not offered for {}", kind, entry.name);
            return;
        }
        self.pending_action = Some(ToolAction {
            kind,
            request: ToolRequest {
                category_idx: entry.category_idx,
                tool_idx: entry.tool_idx,
            },
            tool_name: entry.name.clone(),
        });
    }

    pub fn show_spinner(&mut self) {
        self.spinner_visible = true;
    }

    pub fn hide_spinner(&mut self) {
        self.spinner_visible = false;
    }

    pub fn present(&mut self, content: &ModalContent) {
        self.output_modal.present_content(content);
    }

    pub fn toggle_help(&mut self) {
        self.help_visible = !self.help_visible;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Rows and columns available to the terminal display, if the screen is big enough
    pub fn terminal_geometry(&self) -> Option<(u16, u16)> {
        let area = terminal_content_area(self.screen);
        if area.width == 0 || area.height == 0 {
            None
        } else {
            Some((area.height, area.width))
        }
    }

    pub fn handle_screen_resize(&mut self, screen: Rect) {
        self.screen = screen;
        if self.terminal.is_visible() {
            let geometry = self.terminal_geometry();
            self.terminal.handle_resize(geometry);
        }
    }

    /// Show the outcome of a settled request
    pub fn apply_outcome(&mut self, outcome: ActionOutcome, now: Instant) {
        self.hide_spinner();
        match outcome.resolve() {
            Resolution::Present(content) => self.present(&content),
            Resolution::OpenTerminal { title, session_id } => {
                if let Err(e) = self.terminal.open(&title, &session_id, now) {
                    warn!("Could not open terminal channel: {}", e);
                    self.present(&terminal_open_failure(&e));
                }
            }
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        if self.selected_row >= len {
            self.selected_row = len.saturating_sub(1);
        }
    }
}

pub struct App {
    pub state: AppState,
    api: ToolApiClient,
    outcome_tx: mpsc::UnboundedSender<ActionOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<ActionOutcome>,
}

impl App {
    pub fn new(config: &AppConfig, catalog: Catalog) -> anyhow::Result<Self> {
        let api = ToolApiClient::new(&config.server_url, config.request_timeout())?;
        let connector = SocketIoConnector::new(api.base_url())?;
        info!("Terminal channel endpoint {}", connector.url());
        Ok(Self::with_parts(
            catalog,
            api,
            Box::new(connector),
            config.fit_delay(),
        ))
    }

    pub fn with_parts(
        catalog: Catalog,
        api: ToolApiClient,
        connector: Box<dyn ChannelConnector>,
        fit_delay: Duration,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(catalog, TerminalRelay::new(connector, fit_delay)),
            api,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Send queued requests, apply settled ones, and relay terminal traffic.
    /// Returns true when anything changed that should be redrawn.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if let Some(action) = self.state.pending_action.take() {
            self.dispatch(action);
            changed = true;
        }

        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.state.apply_outcome(outcome, now);
            changed = true;
        }

        if self.state.terminal.pump() > 0 {
            changed = true;
        }
        let geometry = self.state.terminal_geometry();
        if self.state.terminal.poll_fit(now, geometry) {
            changed = true;
        }

        changed
    }

    /// Send a request in the background; its outcome arrives through `tick`
    fn dispatch(&mut self, action: ToolAction) {
        self.state.show_spinner();

        let api = self.api.clone();
        let outcome_tx = self.outcome_tx.clone();
        let ToolAction {
            kind,
            request,
            tool_name,
        } = action;

        tokio::spawn(async move {
            let outcome = match kind {
                ActionKind::Install => ActionOutcome::Install {
                    result: api.install(request).await,
                    tool_name,
                },
                ActionKind::RunInteractive => ActionOutcome::RunInteractive {
                    result: api.run_interactive(request).await,
                    tool_name,
                },
                ActionKind::Info => ActionOutcome::Info {
                    result: api.tool_info(request).await,
                    tool_name,
                },
            };
            // The UI may have quit while the request was in flight
            let _ = outcome_tx.send(outcome);
        });
    }

    /// Tear down the terminal session before exit
    pub fn shutdown(&mut self) {
        self.state.terminal.close();
    }
}
