// ABOUTME: HTTP client for the toolbench server's tool install, run and info endpoints

pub mod client;
pub mod error;
pub mod types;

pub use client::ToolApiClient;
pub use error::ApiError;
pub use types::{InstallResponse, RunInteractiveResponse, ToolInfoResponse, ToolRequest};
