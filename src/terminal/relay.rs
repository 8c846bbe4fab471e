// ABOUTME: Terminal session relay: owns one channel connection and one terminal display
// Relays keystrokes and resizes to the remote process and writes its output to the display

use crate::terminal::channel::{ChannelConnection, ChannelConnector, ChannelError};
use crate::terminal::protocol::{ChannelCommand, ChannelEvent};
use crate::terminal::terminal_emulator::TerminalDisplay;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Size used until the display is first fitted to the modal
pub const DEFAULT_ROWS: u16 = 24;
pub const DEFAULT_COLS: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    /// Waiting for a new connection to report `Connect`
    Opening,
    Active,
    /// Connection lost; the modal stays until the user closes it
    Disconnected,
    Closed,
}

pub struct TerminalRelay {
    connector: Box<dyn ChannelConnector>,
    connection: Option<Box<dyn ChannelConnection>>,
    display: Option<TerminalDisplay>,
    state: RelayState,
    visible: bool,
    title: String,
    /// Session token to start once a fresh connection comes up
    pending_token: Option<String>,
    fit_due: Option<Instant>,
    fit_delay: Duration,
}

impl TerminalRelay {
    pub fn new(connector: Box<dyn ChannelConnector>, fit_delay: Duration) -> Self {
        Self {
            connector,
            connection: None,
            display: None,
            state: RelayState::Idle,
            visible: false,
            title: String::new(),
            pending_token: None,
            fit_due: None,
            fit_delay,
        }
    }

    /// Show the terminal for a backend session, connecting first when needed
    pub fn open(&mut self, title: &str, session_token: &str, now: Instant) -> Result<(), ChannelError> {
        let live = self.is_connected();

        if live {
            debug!("Reusing live terminal channel");
            self.emit(ChannelCommand::start_terminal(session_token));
            self.pending_token = None;
            self.state = RelayState::Active;
        } else {
            let connection = self.connector.connect()?;
            if let Some(mut stale) = self.connection.replace(connection) {
                stale.disconnect();
            }
            self.pending_token = Some(session_token.to_string());
            self.state = RelayState::Opening;
        }

        match self.display.as_mut() {
            Some(display) => display.clear(),
            None => self.display = Some(TerminalDisplay::new(DEFAULT_ROWS, DEFAULT_COLS)),
        }

        self.title = format!("Interactive Terminal - {title}");
        self.visible = true;
        // Fit once the modal has been drawn at its real size
        self.fit_due = Some(now + self.fit_delay);
        info!("Opened terminal for {} ({:?})", title, self.state);
        Ok(())
    }

    /// Drain and apply every buffered channel event. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.connection.as_mut().and_then(|c| c.try_next_event()) {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connect => {
                info!("Terminal channel connected");
                if let Some(token) = self.pending_token.take() {
                    self.emit(ChannelCommand::start_terminal(token));
                    self.state = RelayState::Active;
                }
            }
            ChannelEvent::TerminalReady(details) => {
                info!("Terminal ready: {}", details);
            }
            ChannelEvent::TerminalOutput(output) => {
                self.write(&output);
            }
            ChannelEvent::TerminalError(message) => {
                self.write(&format!("\r\n\x1b[31mError: {message}\x1b[0m\r\n"));
            }
            ChannelEvent::Disconnect => {
                info!("Terminal channel disconnected");
                self.write("\r\n\x1b[33mConnection closed\x1b[0m\r\n");
                self.pending_token = None;
                self.state = RelayState::Disconnected;
            }
        }
    }

    /// Forward user input while connected; dropped otherwise. Returns whether it was sent.
    pub fn send_input(&mut self, input: &str) -> bool {
        if input.is_empty() || !self.is_connected() {
            return false;
        }
        self.emit(ChannelCommand::input(input))
    }

    /// Refit the display after a window resize and tell the server the new size.
    /// `geometry` is `(rows, cols)`, or `None` when it cannot be determined.
    pub fn handle_resize(&mut self, geometry: Option<(u16, u16)>) {
        if !self.visible {
            return;
        }
        let Some((rows, cols)) = geometry else {
            return;
        };
        if let Some(display) = self.display.as_mut() {
            display.resize(rows, cols);
        }
        if self.is_connected() {
            self.emit(ChannelCommand::resize(rows, cols));
        }
    }

    /// Run the deferred fit scheduled by `open` once it is due
    pub fn poll_fit(&mut self, now: Instant, geometry: Option<(u16, u16)>) -> bool {
        match self.fit_due {
            Some(due) if now >= due => {
                self.fit_due = None;
                if let (Some(display), Some((rows, cols))) = (self.display.as_mut(), geometry) {
                    display.resize(rows, cols);
                    debug!("Fitted terminal display to {}x{}", cols, rows);
                }
                true
            }
            _ => false,
        }
    }

    /// Hide the terminal and tear down connection and display. Safe to repeat.
    pub fn close(&mut self) {
        self.visible = false;
        self.pending_token = None;
        self.fit_due = None;

        if let Some(mut connection) = self.connection.take() {
            if connection.is_connected() {
                connection.disconnect();
            }
        }
        if self.display.take().is_some() {
            info!("Disposed terminal display");
        }
        if self.state != RelayState::Idle {
            self.state = RelayState::Closed;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_connected(&self) -> bool {
        self.connection.as_ref().is_some_and(|c| c.is_connected())
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn display(&self) -> Option<&TerminalDisplay> {
        self.display.as_ref()
    }

    pub fn display_mut(&mut self) -> Option<&mut TerminalDisplay> {
        self.display.as_mut()
    }

    fn write(&mut self, text: &str) {
        match self.display.as_mut() {
            Some(display) => display.write(text),
            None => debug!("Dropping {} bytes with no terminal display", text.len()),
        }
    }

    fn emit(&self, command: ChannelCommand) -> bool {
        let Some(connection) = self.connection.as_ref() else {
            return false;
        };
        match connection.emit(command) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to emit terminal command: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::channel::MockChannelConnector;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Wire {
        connected: bool,
        sent: Vec<ChannelCommand>,
        inbound: VecDeque<ChannelEvent>,
        disconnects: usize,
    }

    struct FakeConnection(Arc<Mutex<Wire>>);

    impl ChannelConnection for FakeConnection {
        fn is_connected(&self) -> bool {
            self.0.lock().unwrap().connected
        }

        fn emit(&self, command: ChannelCommand) -> Result<(), ChannelError> {
            let mut wire = self.0.lock().unwrap();
            if !wire.connected {
                return Err(ChannelError::NotConnected);
            }
            wire.sent.push(command);
            Ok(())
        }

        fn try_next_event(&mut self) -> Option<ChannelEvent> {
            self.0.lock().unwrap().inbound.pop_front()
        }

        fn disconnect(&mut self) {
            let mut wire = self.0.lock().unwrap();
            wire.connected = false;
            wire.disconnects += 1;
        }
    }

    /// Relay whose connector hands out connections on `wire`, at most `times` times
    fn relay_with(wire: &Arc<Mutex<Wire>>, times: usize) -> TerminalRelay {
        let mut connector = MockChannelConnector::new();
        let shared = wire.clone();
        connector
            .expect_connect()
            .times(times)
            .returning(move || Ok(Box::new(FakeConnection(shared.clone()))));
        TerminalRelay::new(Box::new(connector), Duration::from_millis(100))
    }

    fn server_connects(wire: &Arc<Mutex<Wire>>) {
        let mut w = wire.lock().unwrap();
        w.connected = true;
        w.inbound.push_back(ChannelEvent::Connect);
    }

    fn push(wire: &Arc<Mutex<Wire>>, event: ChannelEvent) {
        wire.lock().unwrap().inbound.push_back(event);
    }

    #[test]
    fn fresh_connection_starts_terminal_on_connect() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let mut relay = relay_with(&wire, 1);

        relay.open("Nmap", "tok-1", Instant::now()).unwrap();
        assert_eq!(relay.state(), RelayState::Opening);
        assert!(relay.is_visible());
        assert_eq!(relay.title(), "Interactive Terminal - Nmap");
        assert!(wire.lock().unwrap().sent.is_empty());

        server_connects(&wire);
        assert_eq!(relay.pump(), 1);
        assert_eq!(relay.state(), RelayState::Active);
        assert_eq!(
            wire.lock().unwrap().sent,
            vec![ChannelCommand::start_terminal("tok-1")]
        );
    }

    #[test]
    fn reopening_reuses_live_connection() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        // A second connect would violate the mock's expectation
        let mut relay = relay_with(&wire, 1);

        relay.open("Nmap", "tok-1", Instant::now()).unwrap();
        server_connects(&wire);
        relay.pump();
        relay.open("Wireshark", "tok-2", Instant::now()).unwrap();

        assert_eq!(relay.state(), RelayState::Active);
        assert_eq!(
            wire.lock().unwrap().sent,
            vec![
                ChannelCommand::start_terminal("tok-1"),
                ChannelCommand::start_terminal("tok-2"),
            ]
        );
    }

    #[test]
    fn reopening_after_disconnect_connects_again() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let mut relay = relay_with(&wire, 2);

        relay.open("Nmap", "tok-1", Instant::now()).unwrap();
        server_connects(&wire);
        relay.pump();
        wire.lock().unwrap().connected = false;
        push(&wire, ChannelEvent::Disconnect);
        relay.pump();
        assert_eq!(relay.state(), RelayState::Disconnected);

        relay.open("Nmap", "tok-2", Instant::now()).unwrap();
        assert_eq!(relay.state(), RelayState::Opening);
    }

    #[test]
    fn output_is_written_in_order() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let mut relay = relay_with(&wire, 1);
        relay.open("t", "tok", Instant::now()).unwrap();
        server_connects(&wire);
        for chunk in ["a", "b", "c"] {
            push(&wire, ChannelEvent::TerminalOutput(chunk.into()));
        }
        assert_eq!(relay.pump(), 4);
        assert_eq!(relay.display().unwrap().contents(), "abc");
    }

    #[test]
    fn terminal_error_is_shown_and_session_stays_active() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let mut relay = relay_with(&wire, 1);
        relay.open("t", "tok", Instant::now()).unwrap();
        server_connects(&wire);
        push(&wire, ChannelEvent::TerminalError("Invalid or expired session".into()));
        relay.pump();

        assert_eq!(relay.state(), RelayState::Active);
        assert!(relay.is_visible());
        assert!(relay
            .display()
            .unwrap()
            .contents()
            .contains("Error: Invalid or expired session"));
    }

    #[test]
    fn disconnect_leaves_modal_open_with_notice() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let mut relay = relay_with(&wire, 1);
        relay.open("t", "tok", Instant::now()).unwrap();
        server_connects(&wire);
        relay.pump();
        wire.lock().unwrap().connected = false;
        push(&wire, ChannelEvent::Disconnect);
        relay.pump();

        assert!(relay.is_visible());
        assert_eq!(relay.state(), RelayState::Disconnected);
        assert!(relay.display().unwrap().contents().contains("Connection closed"));
    }

    #[test]
    fn input_is_forwarded_only_while_connected() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let mut relay = relay_with(&wire, 1);
        relay.open("t", "tok", Instant::now()).unwrap();

        assert!(!relay.send_input("early"));

        server_connects(&wire);
        relay.pump();
        assert!(relay.send_input("ls\r"));

        wire.lock().unwrap().connected = false;
        assert!(!relay.send_input("late"));

        let sent = wire.lock().unwrap().sent.clone();
        assert_eq!(
            sent,
            vec![
                ChannelCommand::start_terminal("tok"),
                ChannelCommand::input("ls\r"),
            ]
        );
    }

    #[test]
    fn resize_refits_and_notifies_when_connected() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let mut relay = relay_with(&wire, 1);
        relay.open("t", "tok", Instant::now()).unwrap();
        server_connects(&wire);
        relay.pump();

        relay.handle_resize(Some((30, 100)));
        assert_eq!(relay.display().unwrap().size(), (30, 100));
        assert_eq!(
            wire.lock().unwrap().sent.last(),
            Some(&ChannelCommand::resize(30, 100))
        );

        let before = wire.lock().unwrap().sent.len();
        relay.handle_resize(None);
        assert_eq!(wire.lock().unwrap().sent.len(), before);
    }

    #[test]
    fn resize_is_ignored_while_hidden() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let mut relay = relay_with(&wire, 0);
        relay.handle_resize(Some((30, 100)));
        assert!(relay.display().is_none());
        assert!(wire.lock().unwrap().sent.is_empty());
    }

    #[test]
    fn fit_runs_once_after_delay() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let mut relay = relay_with(&wire, 1);
        let opened = Instant::now();
        relay.open("t", "tok", opened).unwrap();

        assert!(!relay.poll_fit(opened, Some((10, 40))));
        assert_eq!(relay.display().unwrap().size(), (DEFAULT_ROWS, DEFAULT_COLS));

        let later = opened + Duration::from_millis(150);
        assert!(relay.poll_fit(later, Some((10, 40))));
        assert_eq!(relay.display().unwrap().size(), (10, 40));
        assert!(!relay.poll_fit(later, Some((12, 40))));
    }

    #[test]
    fn close_is_idempotent() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let mut relay = relay_with(&wire, 1);
        relay.open("t", "tok", Instant::now()).unwrap();
        server_connects(&wire);
        relay.pump();

        relay.close();
        relay.close();

        assert!(!relay.is_visible());
        assert!(relay.display().is_none());
        assert!(!relay.is_connected());
        assert_eq!(relay.state(), RelayState::Closed);
        assert_eq!(wire.lock().unwrap().disconnects, 1);
    }

    #[test]
    fn close_before_any_open_is_a_no_op() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let mut relay = relay_with(&wire, 0);
        relay.close();
        assert_eq!(relay.state(), RelayState::Idle);
        assert_eq!(wire.lock().unwrap().disconnects, 0);
    }

    #[test]
    fn failed_connect_creates_nothing() {
        let mut connector = MockChannelConnector::new();
        connector
            .expect_connect()
            .times(1)
            .returning(|| Err(ChannelError::NoRuntime));
        let mut relay = TerminalRelay::new(Box::new(connector), Duration::ZERO);

        assert!(relay.open("t", "tok", Instant::now()).is_err());
        assert!(relay.display().is_none());
        assert!(!relay.is_visible());
        assert_eq!(relay.state(), RelayState::Idle);
    }
}
