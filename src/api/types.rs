// ABOUTME: Request and response payloads of the server HTTP API

use serde::{Deserialize, Serialize};

/// Body of every tool endpoint: the tool's position in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub category_idx: usize,
    pub tool_idx: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstallResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub output: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunInteractiveResponse {
    #[serde(default)]
    pub success: bool,
    pub session_id: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
    /// Tool cannot run in an interactive session
    #[serde(default)]
    pub fallback: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolInfoResponse {
    #[serde(default)]
    pub success: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_url: Option<String>,
    #[serde(default)]
    pub install_commands: Vec<String>,
    #[serde(default)]
    pub run_commands: Vec<String>,
    pub error: Option<String>,
}

/// First of the two values that is present and non-empty, or an empty string
pub fn first_non_empty(primary: Option<&str>, secondary: Option<&str>) -> String {
    [primary, secondary]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}
