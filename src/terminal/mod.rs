// ABOUTME: Terminal module for interactive tool sessions relayed over a Socket.IO channel
// Wire protocol, channel connection, key encoding, terminal display and the session relay

pub mod channel;
pub mod input;
pub mod protocol;
pub mod relay;
pub mod terminal_emulator;
pub mod websocket_client;

pub use channel::{ChannelConnection, ChannelConnector, ChannelError};
pub use protocol::{ChannelCommand, ChannelEvent, ConnectionState};
pub use relay::{RelayState, TerminalRelay};
pub use terminal_emulator::TerminalDisplay;
pub use websocket_client::{SocketIoClient, SocketIoConnector};
