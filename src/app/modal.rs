// ABOUTME: Output modal presenter used for install results, run failures and tool info
// Holds the title, status line, body and success/error styling of a single overlay

use ratatui::layout::Rect;

pub const EMPTY_BODY_PLACEHOLDER: &str = "No output available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalStatus {
    Success,
    Error,
}

impl ModalStatus {
    pub fn from_success(is_success: bool) -> Self {
        if is_success {
            ModalStatus::Success
        } else {
            ModalStatus::Error
        }
    }
}

/// Everything a single `present` call shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalContent {
    pub title: String,
    pub status_message: String,
    pub body: Option<String>,
    pub is_success: bool,
}

impl ModalContent {
    pub fn success(title: String, status_message: String, body: Option<String>) -> Self {
        Self {
            title,
            status_message,
            body,
            is_success: true,
        }
    }

    pub fn failure(title: String, status_message: String, body: Option<String>) -> Self {
        Self {
            title,
            status_message,
            body,
            is_success: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputModal {
    visible: bool,
    pub title: String,
    pub status_message: String,
    pub body: String,
    pub status: ModalStatus,
    /// Lines scrolled from the top of the body
    pub scroll: u16,
}

impl Default for OutputModal {
    fn default() -> Self {
        Self {
            visible: false,
            title: String::new(),
            status_message: String::new(),
            body: String::new(),
            status: ModalStatus::Success,
            scroll: 0,
        }
    }
}

impl OutputModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn present(&mut self, title: &str, status_message: &str, body: Option<&str>, is_success: bool) {
        self.title = title.to_string();
        self.status_message = status_message.to_string();
        self.body = match body {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => EMPTY_BODY_PLACEHOLDER.to_string(),
        };
        self.status = ModalStatus::from_success(is_success);
        self.scroll = 0;
        self.visible = true;
    }

    pub fn present_content(&mut self, content: &ModalContent) {
        self.present(
            &content.title,
            &content.status_message,
            content.body.as_deref(),
            content.is_success,
        );
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = u16::try_from(self.body.lines().count()).unwrap_or(u16::MAX);
        self.scroll = self.scroll.saturating_add(lines).min(max);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }
}

/// True when a click at (`column`, `row`) lands on the backdrop around
/// `modal_area` rather than on the modal itself
pub fn is_backdrop_click(modal_area: Rect, column: u16, row: u16) -> bool {
    let inside = column >= modal_area.left()
        && column < modal_area.right()
        && row >= modal_area.top()
        && row < modal_area.bottom();
    !inside
}
