// ABOUTME: Terminal display for remote process output, backed by a vt100 screen
// Processes ANSI escape codes and renders the resulting text grid with ratatui

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Widget},
};
use tracing::trace;

const SCROLLBACK_LINES: usize = 10_000;

/// Text-grid surface that remote output is written into
pub struct TerminalDisplay {
    /// VT100 parser holding screen and scrollback
    parser: vt100::Parser,

    /// Current scroll offset (0 = bottom/latest)
    scroll_offset: usize,

    /// Terminal dimensions
    rows: u16,
    cols: u16,
}

impl TerminalDisplay {
    pub fn new(rows: u16, cols: u16) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            parser: vt100::Parser::new(rows, cols, SCROLLBACK_LINES),
            scroll_offset: 0,
            rows,
            cols,
        }
    }

    /// Write raw output, escape sequences included
    pub fn write(&mut self, data: &str) {
        trace!("Terminal display processing {} bytes", data.len());
        self.parser.process(data.as_bytes());
        self.scroll_to_bottom();
    }

    /// Visible text of the screen, trailing blanks trimmed
    pub fn contents(&self) -> String {
        self.parser.screen().contents()
    }

    pub fn clear(&mut self) {
        self.parser = vt100::Parser::new(self.rows, self.cols, SCROLLBACK_LINES);
        self.scroll_offset = 0;
    }

    pub fn resize(&mut self, rows: u16, cols: u16) {
        let rows = rows.max(1);
        let cols = cols.max(1);
        if (rows, cols) == (self.rows, self.cols) {
            return;
        }
        self.rows = rows;
        self.cols = cols;
        self.parser.set_scrollback(0);
        self.parser.set_size(rows, cols);
        self.parser
            .set_scrollback(self.scroll_offset.min(usize::from(rows)));
        self.scroll_offset = self.parser.screen().scrollback();
    }

    pub fn size(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    /// Scroll back by `n` lines, at most one screen height. vt100 can only
    /// show a scrollback offset up to the number of visible rows.
    pub fn scroll_up(&mut self, n: usize) {
        let wanted = self
            .scroll_offset
            .saturating_add(n)
            .min(usize::from(self.rows));
        self.parser.set_scrollback(wanted);
        // vt100 also clamps to the scrollback it actually holds
        self.scroll_offset = self.parser.screen().scrollback();
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
        self.parser.set_scrollback(self.scroll_offset);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
        self.parser.set_scrollback(0);
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_offset == 0
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Visible screen (or scrollback view) as styled lines
    fn screen_to_text(&self) -> Text<'static> {
        let screen = self.parser.screen();
        let (rows, cols) = screen.size();
        let mut lines = Vec::with_capacity(rows as usize);

        for row in 0..rows {
            let mut spans = Vec::new();
            let mut current_style = Style::default();
            let mut current_text = String::new();

            for col in 0..cols {
                let Some(cell) = screen.cell(row, col) else {
                    current_text.push(' ');
                    continue;
                };
                if cell.is_wide_continuation() {
                    continue;
                }

                let cell_style = Self::cell_style(cell);
                if cell_style != current_style && !current_text.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current_text), current_style));
                }
                current_style = cell_style;

                if cell.has_contents() {
                    current_text.push_str(&cell.contents());
                } else {
                    current_text.push(' ');
                }
            }

            if !current_text.is_empty() {
                spans.push(Span::styled(current_text, current_style));
            }
            lines.push(Line::from(spans));
        }

        Text::from(lines)
    }

    fn cell_style(cell: &vt100::Cell) -> Style {
        let mut style = Style::default();
        if let Some(fg) = map_color(cell.fgcolor()) {
            style = style.fg(fg);
        }
        if let Some(bg) = map_color(cell.bgcolor()) {
            style = style.bg(bg);
        }

        let attributes = [
            (cell.bold(), Modifier::BOLD),
            (cell.italic(), Modifier::ITALIC),
            (cell.underline(), Modifier::UNDERLINED),
            (cell.inverse(), Modifier::REVERSED),
        ];
        attributes
            .into_iter()
            .filter(|(set, _)| *set)
            .fold(style, |style, (_, modifier)| style.add_modifier(modifier))
    }
}

/// The 16 standard palette entries; higher indices pass through as indexed colors
const PALETTE: [Color; 16] = [
    Color::Black,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::Gray,
    Color::DarkGray,
    Color::LightRed,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightBlue,
    Color::LightMagenta,
    Color::LightCyan,
    Color::White,
];

fn map_color(color: vt100::Color) -> Option<Color> {
    match color {
        vt100::Color::Default => None,
        vt100::Color::Idx(n) => Some(PALETTE.get(usize::from(n)).copied().unwrap_or(Color::Indexed(n))),
        vt100::Color::Rgb(r, g, b) => Some(Color::Rgb(r, g, b)),
    }
}

impl Widget for &TerminalDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.screen_to_text()).render(area, buf);

        let screen = self.parser.screen();
        if self.is_at_bottom() && !screen.hide_cursor() && area.width > 0 && area.height > 0 {
            let (cursor_row, cursor_col) = screen.cursor_position();
            let x = area.left() + cursor_col.min(area.width - 1);
            let y = area.top() + cursor_row.min(area.height - 1);
            buf.get_mut(x, y)
                .set_style(Style::default().add_modifier(Modifier::REVERSED));
        }

        if self.scroll_offset > 0 {
            let indicator = format!(" ▲ {} lines above ", self.scroll_offset);
            buf.set_string(
                area.left(),
                area.top(),
                indicator,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            );
        }
    }
}
