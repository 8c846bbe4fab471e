// ABOUTME: UI components for the TUI interface including tool list, modals, and help

pub mod help;
pub mod layout;
pub mod output_modal;
pub mod search_bar;
pub mod spinner;
pub mod terminal_modal;
pub mod tool_list;

pub use help::HelpComponent;
pub use layout::LayoutComponent;
pub use output_modal::OutputModalComponent;
pub use search_bar::SearchBarComponent;
pub use spinner::SpinnerComponent;
pub use terminal_modal::TerminalModalComponent;
pub use tool_list::ToolListComponent;
