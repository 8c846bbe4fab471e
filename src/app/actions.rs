// ABOUTME: Turns settled install, run and info requests into what the dashboard shows next

use crate::api::types::first_non_empty;
use crate::api::{ApiError, InstallResponse, RunInteractiveResponse, ToolInfoResponse, ToolRequest};
use crate::app::modal::ModalContent;

pub const RUN_FALLBACK_BODY: &str =
    "This tool may need to be run from the Console tab for full functionality.";

/// A request the UI asked for, waiting to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolAction {
    pub kind: ActionKind,
    pub request: ToolRequest,
    pub tool_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Install,
    RunInteractive,
    Info,
}

/// A request that has settled, delivered back to the UI loop
#[derive(Debug)]
pub enum ActionOutcome {
    Install {
        tool_name: String,
        result: Result<InstallResponse, ApiError>,
    },
    RunInteractive {
        tool_name: String,
        result: Result<RunInteractiveResponse, ApiError>,
    },
    Info {
        tool_name: String,
        result: Result<ToolInfoResponse, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Present(ModalContent),
    OpenTerminal { title: String, session_id: String },
}

impl ActionOutcome {
    pub fn resolve(self) -> Resolution {
        match self {
            ActionOutcome::Install { tool_name, result } => {
                Resolution::Present(install_presentation(&tool_name, result))
            }
            ActionOutcome::RunInteractive { tool_name, result } => run_resolution(&tool_name, result),
            ActionOutcome::Info { tool_name, result } => {
                Resolution::Present(info_presentation(&tool_name, result))
            }
        }
    }
}

pub fn install_presentation(tool_name: &str, result: Result<InstallResponse, ApiError>) -> ModalContent {
    match result {
        Ok(resp) if resp.success => ModalContent::success(
            format!("Installing: {tool_name}"),
            resp.message.unwrap_or_default(),
            resp.output,
        ),
        Ok(resp) => ModalContent::failure(
            format!("Installation Failed: {tool_name}"),
            first_non_empty(resp.error.as_deref(), resp.message.as_deref()),
            Some(non_empty_or(resp.output, "Installation failed")),
        ),
        Err(e) => ModalContent::failure(
            "Error".to_string(),
            "Failed to install tool".to_string(),
            Some(e.to_string()),
        ),
    }
}

pub fn run_resolution(tool_name: &str, result: Result<RunInteractiveResponse, ApiError>) -> Resolution {
    let resp = match result {
        Ok(resp) => resp,
        Err(e) => return run_transport_failure(&e),
    };

    if resp.success {
        return match resp.session_id {
            Some(session_id) if !session_id.is_empty() => Resolution::OpenTerminal {
                title: tool_name.to_string(),
                session_id,
            },
            _ => run_transport_failure(&ApiError::MissingSessionId),
        };
    }

    if resp.fallback {
        return Resolution::Present(ModalContent::failure(
            format!("Info: {tool_name}"),
            resp.message.unwrap_or_default(),
            Some(RUN_FALLBACK_BODY.to_string()),
        ));
    }

    Resolution::Present(ModalContent::failure(
        format!("Run Failed: {tool_name}"),
        first_non_empty(resp.error.as_deref(), resp.message.as_deref()),
        Some("Unable to run this tool".to_string()),
    ))
}

/// Shown when the terminal channel cannot even be created
pub fn terminal_open_failure(error: &dyn std::error::Error) -> ModalContent {
    ModalContent::failure(
        "Error".to_string(),
        "Failed to run tool".to_string(),
        Some(error.to_string()),
    )
}

fn run_transport_failure(error: &ApiError) -> Resolution {
    Resolution::Present(terminal_open_failure(error))
}

pub fn info_presentation(tool_name: &str, result: Result<ToolInfoResponse, ApiError>) -> ModalContent {
    match result {
        Ok(resp) if resp.success => {
            let title = resp.title.unwrap_or_else(|| tool_name.to_string());
            ModalContent::success(
                format!("Info: {title}"),
                resp.description.unwrap_or_default(),
                Some(format_info_body(
                    resp.project_url.as_deref(),
                    &resp.install_commands,
                    &resp.run_commands,
                )),
            )
        }
        Ok(resp) => ModalContent::failure(
            format!("Info Failed: {tool_name}"),
            resp.error.unwrap_or_default(),
            None,
        ),
        Err(e) => ModalContent::failure(
            "Error".to_string(),
            "Failed to load tool info".to_string(),
            Some(e.to_string()),
        ),
    }
}

fn format_info_body(project_url: Option<&str>, install: &[String], run: &[String]) -> String {
    let mut body = String::new();
    if let Some(url) = project_url.filter(|u| !u.is_empty()) {
        body.push_str(&format!("Project: {url}\n\n"));
    }
    for (heading, commands) in [("Install commands", install), ("Run commands", run)] {
        if commands.is_empty() {
            continue;
        }
        body.push_str(heading);
        body.push_str(":\n");
        for command in commands {
            body.push_str(&format!("  $ {command}\n"));
        }
        body.push('\n');
    }
    body.trim_end().to_string()
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn install(json: &str) -> ModalContent {
        install_presentation("Nmap", Ok(serde_json::from_str(json).unwrap()))
    }

    fn run(json: &str) -> Resolution {
        run_resolution("Nmap", Ok(serde_json::from_str(json).unwrap()))
    }

    #[test]
    fn install_success() {
        let content = install(r#"{"success":true,"message":"Nmap installation attempted","output":"$ apt"}"#);
        assert_eq!(
            content,
            ModalContent::success(
                "Installing: Nmap".into(),
                "Nmap installation attempted".into(),
                Some("$ apt".into())
            )
        );
    }

    #[test]
    fn install_failure_uses_error_text_and_failure_style() {
        let content = install(r#"{"success":false,"error":"not found"}"#);
        assert_eq!(content.title, "Installation Failed: Nmap");
        assert_eq!(content.status_message, "not found");
        assert_eq!(content.body.as_deref(), Some("Installation failed"));
        assert!(!content.is_success);
    }

    #[test]
    fn install_failure_falls_back_to_message() {
        let content = install(r#"{"success":false,"message":"No installation commands available"}"#);
        assert_eq!(content.status_message, "No installation commands available");
    }

    fn transport_error() -> ApiError {
        // A request that never leaves the client still yields a reqwest::Error
        let err = reqwest::Client::new()
            .post("not a url")
            .build()
            .unwrap_err();
        ApiError::Transport(err)
    }

    #[test]
    fn install_transport_failure_shows_raw_error() {
        let error = transport_error();
        let raw = error.to_string();
        let content = install_presentation("Nmap", Err(error));
        assert_eq!(content.title, "Error");
        assert_eq!(content.status_message, "Failed to install tool");
        assert!(!content.is_success);
        assert_eq!(content.body, Some(raw));
    }

    #[test]
    fn run_transport_failure_shows_raw_error() {
        let error = transport_error();
        let raw = error.to_string();
        let Resolution::Present(content) = run_resolution("Nmap", Err(error)) else {
            panic!("expected a modal");
        };
        assert_eq!(content.status_message, "Failed to run tool");
        assert_eq!(content.body, Some(raw));
    }

    #[test]
    fn run_success_opens_terminal() {
        assert_eq!(
            run(r#"{"success":true,"session_id":"abc"}"#),
            Resolution::OpenTerminal {
                title: "Nmap".into(),
                session_id: "abc".into()
            }
        );
    }

    #[test]
    fn run_success_without_session_is_an_error() {
        let Resolution::Present(content) = run(r#"{"success":true}"#) else {
            panic!("expected a modal");
        };
        assert_eq!(content.status_message, "Failed to run tool");
        assert!(!content.is_success);
    }

    #[test]
    fn run_fallback_shows_guidance() {
        let Resolution::Present(content) =
            run(r#"{"success":false,"fallback":true,"message":"custom run method"}"#)
        else {
            panic!("expected a modal");
        };
        assert_eq!(content.title, "Info: Nmap");
        assert_eq!(content.status_message, "custom run method");
        assert_eq!(content.body.as_deref(), Some(RUN_FALLBACK_BODY));
        assert!(!content.is_success);
    }

    #[test]
    fn run_failure() {
        let Resolution::Present(content) =
            run(r#"{"success":false,"message":"No run commands available for this tool."}"#)
        else {
            panic!("expected a modal");
        };
        assert_eq!(content.title, "Run Failed: Nmap");
        assert_eq!(content.status_message, "No run commands available for this tool.");
        assert_eq!(content.body.as_deref(), Some("Unable to run this tool"));
    }

    #[test]
    fn info_lists_commands() {
        let content = info_presentation(
            "Nmap",
            Ok(serde_json::from_str(
                r#"{"success":true,"title":"Nmap","description":"scanner","project_url":"https://nmap.org",
                    "install_commands":["apt install nmap"],"run_commands":["nmap -h"]}"#,
            )
            .unwrap()),
        );
        assert_eq!(content.title, "Info: Nmap");
        assert_eq!(content.status_message, "scanner");
        assert_eq!(
            content.body.as_deref(),
            Some("Project: https://nmap.org\n\nInstall commands:\n  $ apt install nmap\n\nRun commands:\n  $ nmap -h")
        );
    }
}
