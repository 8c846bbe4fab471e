// ABOUTME: Main application structure and state management for the TUI

pub mod actions;
pub mod events;
pub mod modal;
pub mod panels;
pub mod search;
pub mod state;

pub use events::{AppEvent, EventHandler};
pub use state::{App, AppState, InputMode, ListRow};
