// ABOUTME: Socket.IO client over tokio-tungstenite for the server's terminal channel
// Runs the socket in a spawned task and exchanges commands and events with the UI over mpsc

use crate::terminal::channel::{channel_url, ChannelConnection, ChannelConnector, ChannelError};
use crate::terminal::protocol::{
    namespace_connect_frame, namespace_disconnect_frame, ChannelCommand, ChannelEvent,
    ConnectionState, EnginePacket, OpenHandshake, SocketPacket,
};
use anyhow::{anyhow, Result};
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite};
use tracing::{debug, error, info, warn};

/// Used until the server's open handshake supplies real heartbeat timings
const DEFAULT_HEARTBEAT_WINDOW: Duration = Duration::from_secs(45);

/// Upper bound on the heartbeat window so deadlines stay representable
const MAX_HEARTBEAT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// How long to wait for the next ping before treating the server as gone
fn heartbeat_window_for(handshake: &OpenHandshake) -> Duration {
    Duration::from_millis(handshake.ping_interval.saturating_add(handshake.ping_timeout))
        .min(MAX_HEARTBEAT_WINDOW)
}

enum Outbound {
    Command(ChannelCommand),
    Disconnect,
}

enum Flow {
    Continue,
    Stop,
}

/// Opens a fresh `SocketIoClient` against the configured server
pub struct SocketIoConnector {
    url: Url,
}

impl SocketIoConnector {
    pub fn new(server: &Url) -> Result<Self, ChannelError> {
        Ok(Self {
            url: channel_url(server)?,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl ChannelConnector for SocketIoConnector {
    fn connect(&self) -> Result<Box<dyn ChannelConnection>, ChannelError> {
        Ok(Box::new(SocketIoClient::spawn(self.url.clone())?))
    }
}

pub struct SocketIoClient {
    url: Url,

    /// Current connection state, written by the socket task
    state: Arc<watch::Sender<ConnectionState>>,

    /// Commands headed for the socket
    outbound: mpsc::UnboundedSender<Outbound>,

    /// Events coming off the socket
    events: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl SocketIoClient {
    /// Start connecting in the background. Must be called inside a tokio runtime.
    pub fn spawn(url: Url) -> Result<Self, ChannelError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ChannelError::NoRuntime)?;

        let (state_tx, _) = watch::channel(ConnectionState::Connecting);
        let state = Arc::new(state_tx);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        info!("Opening terminal channel to {}", url);
        runtime.spawn(Self::connection_task(
            url.clone(),
            state.clone(),
            outbound_rx,
            event_tx,
        ));

        Ok(Self {
            url,
            state,
            outbound: outbound_tx,
            events: event_rx,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    async fn connection_task(
        url: Url,
        state: Arc<watch::Sender<ConnectionState>>,
        mut outbound: mpsc::UnboundedReceiver<Outbound>,
        events: mpsc::UnboundedSender<ChannelEvent>,
    ) {
        match Self::connection_handler(&url, &state, &mut outbound, &events).await {
            Ok(()) => info!("Terminal channel closed"),
            Err(e) => error!("Terminal channel error: {}", e),
        }

        state.send_replace(ConnectionState::Disconnected);
        // Receiver is gone when the relay already dropped this connection
        let _ = events.send(ChannelEvent::Disconnect);
    }

    /// Run one socket from handshake to close
    async fn connection_handler(
        url: &Url,
        state: &watch::Sender<ConnectionState>,
        outbound: &mut mpsc::UnboundedReceiver<Outbound>,
        events: &mpsc::UnboundedSender<ChannelEvent>,
    ) -> Result<()> {
        debug!("Attempting WebSocket handshake with {}", url);
        let (ws_stream, response) = connect_async(url.as_str())
            .await
            .map_err(|e| anyhow!("Failed to connect: {}", e))?;
        debug!("WebSocket response status: {:?}", response.status());

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let mut heartbeat_deadline = Instant::now() + DEFAULT_HEARTBEAT_WINDOW;
        let mut heartbeat_window = DEFAULT_HEARTBEAT_WINDOW;

        loop {
            tokio::select! {
                outgoing = outbound.recv() => {
                    match outgoing {
                        Some(Outbound::Command(command)) => {
                            debug!("Emitting {}", command.event_name());
                            ws_sender.send(tungstenite::Message::Text(command.to_frame())).await?;
                        }
                        Some(Outbound::Disconnect) | None => {
                            info!("Closing terminal channel");
                            let _ = ws_sender
                                .send(tungstenite::Message::Text(namespace_disconnect_frame()))
                                .await;
                            let _ = ws_sender.close().await;
                            return Ok(());
                        }
                    }
                }

                incoming = ws_receiver.next() => {
                    let frame = match incoming {
                        Some(Ok(tungstenite::Message::Text(text))) => text,
                        Some(Ok(tungstenite::Message::Close(_))) | None => {
                            info!("WebSocket closed by server");
                            return Ok(());
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(anyhow!("WebSocket error: {}", e)),
                    };

                    let packet = match EnginePacket::decode(&frame) {
                        Ok(packet) => packet,
                        Err(e) => {
                            warn!("Skipping malformed frame: {}", e);
                            continue;
                        }
                    };

                    match packet {
                        EnginePacket::Open(handshake) => {
                            debug!("Engine session {} opened", handshake.sid);
                            heartbeat_window = heartbeat_window_for(&handshake);
                            heartbeat_deadline = Instant::now() + heartbeat_window;
                            ws_sender.send(tungstenite::Message::Text(namespace_connect_frame())).await?;
                        }
                        EnginePacket::Ping(data) => {
                            heartbeat_deadline = Instant::now() + heartbeat_window;
                            ws_sender.send(tungstenite::Message::Text(EnginePacket::Pong(data).encode())).await?;
                        }
                        EnginePacket::Message(payload) => {
                            if let Flow::Stop = Self::handle_socket_packet(&payload, state, events)? {
                                return Ok(());
                            }
                        }
                        EnginePacket::Close => {
                            info!("Server closed the engine session");
                            return Ok(());
                        }
                        EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
                    }
                }

                () = sleep_until(heartbeat_deadline) => {
                    return Err(anyhow!("No heartbeat from server within {:?}", heartbeat_window));
                }
            }
        }
    }

    fn handle_socket_packet(
        payload: &str,
        state: &watch::Sender<ConnectionState>,
        events: &mpsc::UnboundedSender<ChannelEvent>,
    ) -> Result<Flow> {
        let packet = match SocketPacket::decode(payload) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Skipping socket packet: {}", e);
                return Ok(Flow::Continue);
            }
        };

        match packet {
            SocketPacket::Connect(_) => {
                info!("Terminal channel connected");
                state.send_replace(ConnectionState::Connected);
                Self::forward(events, ChannelEvent::Connect)
            }
            SocketPacket::Event { name, data } => {
                match ChannelEvent::from_socket_event(&name, data) {
                    Some(event) => Self::forward(events, event),
                    None => {
                        debug!("Ignoring event {}", name);
                        Ok(Flow::Continue)
                    }
                }
            }
            SocketPacket::Disconnect => {
                info!("Server disconnected the namespace");
                Ok(Flow::Stop)
            }
            SocketPacket::ConnectError(details) => Err(anyhow!("Connection refused: {}", details)),
        }
    }

    fn forward(events: &mpsc::UnboundedSender<ChannelEvent>, event: ChannelEvent) -> Result<Flow> {
        if events.send(event).is_err() {
            // Nobody is listening any more
            return Ok(Flow::Stop);
        }
        Ok(Flow::Continue)
    }
}

impl ChannelConnection for SocketIoClient {
    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    fn emit(&self, command: ChannelCommand) -> Result<(), ChannelError> {
        if !self.is_connected() {
            return Err(ChannelError::NotConnected);
        }
        self.outbound
            .send(Outbound::Command(command))
            .map_err(|_| ChannelError::Closed)
    }

    fn try_next_event(&mut self) -> Option<ChannelEvent> {
        self.events.try_recv().ok()
    }

    fn disconnect(&mut self) {
        info!("Disconnecting terminal channel {}", self.url);
        self.state.send_replace(ConnectionState::Disconnected);
        let _ = self.outbound.send(Outbound::Disconnect);
    }
}
