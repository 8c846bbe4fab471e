// ABOUTME: Channel abstractions the terminal relay talks through
// A connector creates connections; a connection emits commands and yields events

use crate::terminal::protocol::{ChannelCommand, ChannelEvent};
use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Invalid channel URL {0}: {1}")]
    InvalidUrl(String, String),

    #[error("Channel is not connected")]
    NotConnected,

    #[error("Channel is closed")]
    Closed,

    #[error("No async runtime available to drive the channel")]
    NoRuntime,
}

/// One live bidirectional connection to the server
pub trait ChannelConnection: Send {
    /// True once the server has acknowledged the namespace connection and
    /// until the connection ends
    fn is_connected(&self) -> bool;

    /// Queue a command; commands go out in the order they are emitted
    fn emit(&self, command: ChannelCommand) -> Result<(), ChannelError>;

    /// Next buffered inbound event, if any
    fn try_next_event(&mut self) -> Option<ChannelEvent>;

    fn disconnect(&mut self);
}

#[cfg_attr(test, mockall::automock)]
pub trait ChannelConnector: Send {
    fn connect(&self) -> Result<Box<dyn ChannelConnection>, ChannelError>;
}

/// Socket.IO WebSocket endpoint for a server base URL
pub fn channel_url(server: &Url) -> Result<Url, ChannelError> {
    let invalid = |reason: String| ChannelError::InvalidUrl(server.to_string(), reason);

    let scheme = match server.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(invalid(format!("unsupported scheme {other}"))),
    };

    let mut base = server.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let mut url = base.join("socket.io/").map_err(|e| invalid(e.to_string()))?;
    url.set_scheme(scheme)
        .map_err(|()| invalid("cannot switch to websocket scheme".to_string()))?;
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}
