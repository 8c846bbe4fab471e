// ABOUTME: Tool list component showing collapsible categories and their visible tools

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::{AppState, ListRow};

pub struct ToolListComponent {
    list_state: ListState,
}

impl Default for ToolListComponent {
    fn default() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self { list_state }
    }
}

impl ToolListComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let rows = state.rows();
        self.list_state
            .select((!rows.is_empty()).then(|| state.selected_row.min(rows.len() - 1)));

        let items: Vec<ListItem> = rows.iter().map(|row| Self::build_item(state, *row)).collect();

        let title = if state.search_query.is_empty() {
            "Tools".to_string()
        } else {
            let shown = state.entries.iter().filter(|e| e.visible).count();
            format!("Tools ({shown} matching)")
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title_style(Style::default().fg(Color::Yellow)),
            )
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

        frame.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn build_item(state: &AppState, row: ListRow) -> ListItem<'static> {
        match row {
            ListRow::Category(idx) => {
                let Some(panel) = state.panels.get(idx) else {
                    return ListItem::new("");
                };
                let count = state
                    .entries
                    .iter()
                    .filter(|e| e.category_idx == idx && e.visible)
                    .count();
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{} ", panel.icon().symbol()),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::styled(
                        panel.title.clone(),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!(" · {count}"), Style::default().fg(Color::DarkGray)),
                ]))
            }
            ListRow::Tool(entry_idx) => {
                let Some(entry) = state.entries.get(entry_idx) else {
                    return ListItem::new("");
                };
                let tool = state.catalog.tool(entry.category_idx, entry.tool_idx);
                let marker = |offered: bool, label: &'static str| {
                    if offered {
                        Span::styled(label, Style::default().fg(Color::Green))
                    } else {
                        Span::styled("   ", Style::default())
                    }
                };
                let mut spans = vec![
                    Span::raw("  "),
                    marker(tool.is_some_and(|t| t.has_install()), "[i]"),
                    marker(tool.is_some_and(|t| t.has_run()), "[r]"),
                    Span::raw(" "),
                    Span::styled(entry.name.clone(), Style::default().fg(Color::White)),
                ];
                if !entry.description.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", entry.description),
                        Style::default().fg(Color::Gray),
                    ));
                }
                ListItem::new(Line::from(spans))
            }
        }
    }
}
