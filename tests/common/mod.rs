// ABOUTME: Shared fixtures for integration tests: an in-memory channel and a ready-made app
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use toolbench::api::ToolApiClient;
use toolbench::app::App;
use toolbench::models::Catalog;
use toolbench::terminal::{
    ChannelCommand, ChannelConnection, ChannelConnector, ChannelError, ChannelEvent,
};

/// What the fake server side has seen and will send
#[derive(Default)]
pub struct FakeWire {
    pub connects: usize,
    pub disconnects: usize,
    pub connected: bool,
    pub emitted: Vec<ChannelCommand>,
    pub inbound: VecDeque<ChannelEvent>,
    pub refuse: bool,
}

pub type SharedWire = Arc<Mutex<FakeWire>>;

pub struct FakeConnector {
    wire: SharedWire,
}

impl FakeConnector {
    pub fn new() -> (Self, SharedWire) {
        let wire = SharedWire::default();
        (Self { wire: wire.clone() }, wire)
    }
}

impl ChannelConnector for FakeConnector {
    fn connect(&self) -> Result<Box<dyn ChannelConnection>, ChannelError> {
        let mut wire = self.wire.lock().unwrap();
        if wire.refuse {
            return Err(ChannelError::Closed);
        }
        wire.connects += 1;
        Ok(Box::new(FakeConnection {
            wire: self.wire.clone(),
        }))
    }
}

struct FakeConnection {
    wire: SharedWire,
}

impl ChannelConnection for FakeConnection {
    fn is_connected(&self) -> bool {
        self.wire.lock().unwrap().connected
    }

    fn emit(&self, command: ChannelCommand) -> Result<(), ChannelError> {
        let mut wire = self.wire.lock().unwrap();
        if !wire.connected {
            return Err(ChannelError::NotConnected);
        }
        wire.emitted.push(command);
        Ok(())
    }

    fn try_next_event(&mut self) -> Option<ChannelEvent> {
        let mut wire = self.wire.lock().unwrap();
        let event = wire.inbound.pop_front()?;
        match event {
            ChannelEvent::Connect => wire.connected = true,
            ChannelEvent::Disconnect => wire.connected = false,
            _ => {}
        }
        Some(event)
    }

    fn disconnect(&mut self) {
        let mut wire = self.wire.lock().unwrap();
        wire.connected = false;
        wire.disconnects += 1;
    }
}

pub fn push_event(wire: &SharedWire, event: ChannelEvent) {
    wire.lock().unwrap().inbound.push_back(event);
}

/// App over the built-in catalog, a fake channel, and an unreachable server
pub fn test_app() -> (App, SharedWire) {
    let (connector, wire) = FakeConnector::new();
    let api = ToolApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
    let catalog = Catalog::builtin().unwrap();
    let app = App::with_parts(catalog, api, Box::new(connector), Duration::from_millis(100));
    (app, wire)
}
