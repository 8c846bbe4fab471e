// ABOUTME: Wire protocol for the terminal channel: Engine.IO v4 / Socket.IO v5 text framing
// plus the closed sets of terminal events the server emits and commands the client sends

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty frame")]
    Empty,

    #[error("unknown packet type {0:?}")]
    UnknownType(char),

    #[error("unsupported packet: {0}")]
    Unsupported(String),

    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),
}

// ============================================
// Terminal events and commands
// ============================================

/// Events delivered by the channel, in transport order
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Socket.IO namespace connection acknowledged
    Connect,
    TerminalReady(Value),
    TerminalOutput(String),
    TerminalError(String),
    /// Connection ended, from either side
    Disconnect,
}

/// Commands the client emits on the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelCommand {
    StartTerminal { session_id: String },
    TerminalInput { input: String },
    TerminalResize { rows: u16, cols: u16 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StartTerminalPayload<'a> {
    session_id: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TerminalInputPayload<'a> {
    input: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TerminalResizePayload {
    rows: u16,
    cols: u16,
}

#[derive(Debug, Clone, Deserialize)]
struct TerminalOutputPayload {
    #[serde(default)]
    output: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TerminalErrorPayload {
    #[serde(default)]
    error: String,
}

impl ChannelCommand {
    pub fn start_terminal(session_id: impl Into<String>) -> Self {
        ChannelCommand::StartTerminal {
            session_id: session_id.into(),
        }
    }

    pub fn input(input: impl Into<String>) -> Self {
        ChannelCommand::TerminalInput {
            input: input.into(),
        }
    }

    pub fn resize(rows: u16, cols: u16) -> Self {
        ChannelCommand::TerminalResize { rows, cols }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            ChannelCommand::StartTerminal { .. } => "start_terminal",
            ChannelCommand::TerminalInput { .. } => "terminal_input",
            ChannelCommand::TerminalResize { .. } => "terminal_resize",
        }
    }

    pub fn payload(&self) -> Value {
        let payload = match self {
            ChannelCommand::StartTerminal { session_id } => {
                serde_json::to_value(StartTerminalPayload { session_id })
            }
            ChannelCommand::TerminalInput { input } => {
                serde_json::to_value(TerminalInputPayload { input })
            }
            ChannelCommand::TerminalResize { rows, cols } => {
                serde_json::to_value(TerminalResizePayload {
                    rows: *rows,
                    cols: *cols,
                })
            }
        };
        // Plain structs of strings and integers always serialize
        payload.unwrap_or(Value::Null)
    }

    /// Full text frame for this command
    pub fn to_frame(&self) -> String {
        EnginePacket::Message(
            SocketPacket::Event {
                name: self.event_name().to_string(),
                data: self.payload(),
            }
            .encode(),
        )
        .encode()
    }
}

impl ChannelEvent {
    /// Map a named Socket.IO event onto the terminal event set.
    /// Unknown names and malformed payloads yield `None`.
    pub fn from_socket_event(name: &str, data: Value) -> Option<Self> {
        match name {
            "terminal_ready" => Some(ChannelEvent::TerminalReady(data)),
            "terminal_output" => serde_json::from_value::<TerminalOutputPayload>(data)
                .ok()
                .map(|p| ChannelEvent::TerminalOutput(p.output)),
            "terminal_error" => serde_json::from_value::<TerminalErrorPayload>(data)
                .ok()
                .map(|p| ChannelEvent::TerminalError(p.error)),
            _ => None,
        }
    }
}

// ============================================
// Connection State
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

// ============================================
// Engine.IO packets
// ============================================

/// Payload of the Engine.IO open packet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    pub max_payload: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(OpenHandshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, DecodeError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(DecodeError::Empty)?;
        let rest = chars.as_str();

        match kind {
            '0' => serde_json::from_str(rest)
                .map(EnginePacket::Open)
                .map_err(|e| DecodeError::InvalidJson(e.to_string())),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(rest.to_string())),
            '3' => Ok(EnginePacket::Pong(rest.to_string())),
            '4' => Ok(EnginePacket::Message(rest.to_string())),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(DecodeError::UnknownType(other)),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            // Only servers send open packets; encoded without the handshake body
            EnginePacket::Open(_) => "0".to_string(),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{data}"),
            EnginePacket::Pong(data) => format!("3{data}"),
            EnginePacket::Message(data) => format!("4{data}"),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

// ============================================
// Socket.IO packets (default namespace only)
// ============================================

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, data: Value },
    ConnectError(Value),
}

impl SocketPacket {
    pub fn decode(payload: &str) -> Result<Self, DecodeError> {
        let mut chars = payload.chars();
        let kind = chars.next().ok_or(DecodeError::Empty)?;
        let body = strip_default_namespace(chars.as_str())?;

        match kind {
            '0' => {
                if body.is_empty() {
                    Ok(SocketPacket::Connect(None))
                } else {
                    parse_json(body).map(|v| SocketPacket::Connect(Some(v)))
                }
            }
            '1' => Ok(SocketPacket::Disconnect),
            '2' => {
                // Skip an optional ack id preceding the argument array
                let args = body.trim_start_matches(|c: char| c.is_ascii_digit());
                let Value::Array(mut items) = parse_json(args)? else {
                    return Err(DecodeError::InvalidJson("event is not an array".to_string()));
                };
                if items.is_empty() {
                    return Err(DecodeError::InvalidJson("event has no name".to_string()));
                }
                let Value::String(name) = items.remove(0) else {
                    return Err(DecodeError::InvalidJson("event name is not a string".to_string()));
                };
                let data = if items.is_empty() {
                    Value::Null
                } else {
                    items.swap_remove(0)
                };
                Ok(SocketPacket::Event { name, data })
            }
            '4' => {
                if body.is_empty() {
                    Ok(SocketPacket::ConnectError(Value::Null))
                } else {
                    parse_json(body).map(SocketPacket::ConnectError)
                }
            }
            '3' => Err(DecodeError::Unsupported("ack".to_string())),
            '5' | '6' => Err(DecodeError::Unsupported("binary packet".to_string())),
            other => Err(DecodeError::UnknownType(other)),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            SocketPacket::Connect(None) => "0".to_string(),
            SocketPacket::Connect(Some(auth)) => format!("0{auth}"),
            SocketPacket::Disconnect => "1".to_string(),
            SocketPacket::Event { name, data } => {
                let args = if data.is_null() {
                    Value::Array(vec![Value::String(name.clone())])
                } else {
                    Value::Array(vec![Value::String(name.clone()), data.clone()])
                };
                format!("2{args}")
            }
            SocketPacket::ConnectError(data) => format!("4{data}"),
        }
    }
}

fn strip_default_namespace(body: &str) -> Result<&str, DecodeError> {
    if !body.starts_with('/') {
        return Ok(body);
    }
    let (namespace, rest) = body.split_once(',').unwrap_or((body, ""));
    if namespace == "/" {
        Ok(rest)
    } else {
        Err(DecodeError::Unsupported(format!("namespace {namespace}")))
    }
}

fn parse_json(text: &str) -> Result<Value, DecodeError> {
    serde_json::from_str(text).map_err(|e| DecodeError::InvalidJson(e.to_string()))
}

/// Client frame that joins the default namespace after the Engine.IO open
pub fn namespace_connect_frame() -> String {
    EnginePacket::Message(SocketPacket::Connect(None).encode()).encode()
}

/// Client frame that leaves the default namespace
pub fn namespace_disconnect_frame() -> String {
    EnginePacket::Message(SocketPacket::Disconnect.encode()).encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_engine_open_handshake() {
        let packet = EnginePacket::decode(
            r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();
        let EnginePacket::Open(handshake) = packet else {
            panic!("expected open packet");
        };
        assert_eq!(handshake.sid, "abc");
        assert_eq!(handshake.ping_interval, 25000);
        assert_eq!(handshake.ping_timeout, 20000);
        assert_eq!(handshake.max_payload, Some(1_000_000));
    }

    #[test]
    fn decodes_engine_control_packets() {
        assert_eq!(EnginePacket::decode("1").unwrap(), EnginePacket::Close);
        assert_eq!(EnginePacket::decode("2").unwrap(), EnginePacket::Ping(String::new()));
        assert_eq!(EnginePacket::decode("2probe").unwrap(), EnginePacket::Ping("probe".into()));
        assert_eq!(EnginePacket::decode("6").unwrap(), EnginePacket::Noop);
        assert_eq!(EnginePacket::decode(""), Err(DecodeError::Empty));
        assert_eq!(EnginePacket::decode("9"), Err(DecodeError::UnknownType('9')));
    }

    #[test]
    fn pong_echoes_ping_payload() {
        let EnginePacket::Ping(data) = EnginePacket::decode("2probe").unwrap() else {
            panic!("expected ping");
        };
        assert_eq!(EnginePacket::Pong(data).encode(), "3probe");
    }

    #[test]
    fn decodes_namespace_connect_ack() {
        let EnginePacket::Message(inner) = EnginePacket::decode(r#"40{"sid":"xyz"}"#).unwrap() else {
            panic!("expected message");
        };
        assert_eq!(
            SocketPacket::decode(&inner).unwrap(),
            SocketPacket::Connect(Some(json!({"sid": "xyz"})))
        );
    }

    #[test]
    fn decodes_terminal_output_event() {
        let packet = SocketPacket::decode(r#"2["terminal_output",{"output":"hi\r\n"}]"#).unwrap();
        let SocketPacket::Event { name, data } = packet else {
            panic!("expected event");
        };
        assert_eq!(
            ChannelEvent::from_socket_event(&name, data),
            Some(ChannelEvent::TerminalOutput("hi\r\n".into()))
        );
    }

    #[test]
    fn decodes_event_with_ack_id_and_explicit_namespace() {
        let packet = SocketPacket::decode(r#"2/,12["terminal_error",{"error":"boom"}]"#).unwrap();
        assert_eq!(
            packet,
            SocketPacket::Event {
                name: "terminal_error".into(),
                data: json!({"error": "boom"}),
            }
        );
    }

    #[test]
    fn rejects_other_namespaces_and_binary() {
        assert!(matches!(
            SocketPacket::decode(r#"2/admin,["x"]"#),
            Err(DecodeError::Unsupported(_))
        ));
        assert!(matches!(SocketPacket::decode("51-[\"x\"]"), Err(DecodeError::Unsupported(_))));
    }

    #[test]
    fn rejects_malformed_events() {
        assert!(matches!(SocketPacket::decode("2{}"), Err(DecodeError::InvalidJson(_))));
        assert!(matches!(SocketPacket::decode("2[]"), Err(DecodeError::InvalidJson(_))));
        assert!(matches!(SocketPacket::decode("2[1]"), Err(DecodeError::InvalidJson(_))));
    }

    #[test]
    fn event_without_data_decodes_to_null() {
        assert_eq!(
            SocketPacket::decode(r#"2["terminal_ready"]"#).unwrap(),
            SocketPacket::Event {
                name: "terminal_ready".into(),
                data: Value::Null,
            }
        );
    }

    #[test]
    fn unknown_event_names_are_ignored() {
        assert_eq!(ChannelEvent::from_socket_event("chat", json!({})), None);
        assert_eq!(
            ChannelEvent::from_socket_event("terminal_ready", json!({"status": "connected"})),
            Some(ChannelEvent::TerminalReady(json!({"status": "connected"})))
        );
    }

    #[test]
    fn encodes_commands_as_event_frames() {
        assert_eq!(
            ChannelCommand::start_terminal("tok-1").to_frame(),
            r#"42["start_terminal",{"session_id":"tok-1"}]"#
        );
        assert_eq!(
            ChannelCommand::input("ls\r").to_frame(),
            r#"42["terminal_input",{"input":"ls\r"}]"#
        );
        assert_eq!(
            ChannelCommand::resize(24, 80).to_frame(),
            r#"42["terminal_resize",{"rows":24,"cols":80}]"#
        );
    }

    #[test]
    fn namespace_frames() {
        assert_eq!(namespace_connect_frame(), "40");
        assert_eq!(namespace_disconnect_frame(), "41");
    }
}
