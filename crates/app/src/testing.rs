//! In-memory hub and dispatcher fakes shared by the service tests.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use irhub_domain::error::IrHubError;
use irhub_domain::framing::Terminator;
use irhub_domain::health::DispatcherHealth;

use crate::ports::{ConnectionFactory, Dispatcher, HubConnection};

#[derive(Default)]
struct HubState {
    connects: usize,
    closes: usize,
    failing_connects: usize,
    failing_sends: usize,
    sent: Vec<(u64, String, Terminator)>,
    script: VecDeque<String>,
    answers: HashMap<String, String>,
}

/// Scripted hub. Replies `OK` unless told otherwise.
#[derive(Clone, Default)]
pub(crate) struct FakeHub {
    state: Arc<Mutex<HubState>>,
}

impl FakeHub {
    fn with<T>(&self, f: impl FnOnce(&mut HubState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    pub(crate) fn connects(&self) -> usize {
        self.with(|s| s.connects)
    }

    pub(crate) fn closes(&self) -> usize {
        self.with(|s| s.closes)
    }

    pub(crate) fn fail_connects(&self, count: usize) {
        self.with(|s| s.failing_connects = count);
    }

    pub(crate) fn fail_sends(&self, count: usize) {
        self.with(|s| s.failing_sends = count);
    }

    /// Queue replies consumed in order by the next commands.
    pub(crate) fn reply(&self, reply: &str) {
        self.with(|s| s.script.push_back(reply.to_string()));
    }

    /// Fixed reply for one exact command.
    pub(crate) fn answer(&self, command: &str, reply: &str) {
        self.with(|s| {
            s.answers.insert(command.to_string(), reply.to_string());
        });
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.with(|s| s.sent.iter().map(|(_, c, _)| c.clone()).collect())
    }

    pub(crate) fn sent_with_terminator(&self) -> Vec<(String, Terminator)> {
        self.with(|s| s.sent.iter().map(|(_, c, t)| (c.clone(), *t)).collect())
    }
}

impl ConnectionFactory for FakeHub {
    type Connection = FakeConnection;

    fn create(&self, instance_id: u64) -> FakeConnection {
        FakeConnection {
            hub: self.clone(),
            instance_id,
            connected: false,
        }
    }

    fn endpoint(&self) -> String {
        "fake-hub:40000".to_string()
    }
}

pub(crate) struct FakeConnection {
    hub: FakeHub,
    instance_id: u64,
    connected: bool,
}

fn io_error(kind: io::ErrorKind) -> IrHubError {
    IrHubError::transport(io::Error::from(kind))
}

impl HubConnection for FakeConnection {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self) -> Result<(), IrHubError> {
        let refused = self.hub.with(|s| {
            if s.failing_connects > 0 {
                s.failing_connects -= 1;
                true
            } else {
                s.connects += 1;
                false
            }
        });
        if refused {
            return Err(io_error(io::ErrorKind::ConnectionRefused));
        }
        self.connected = true;
        Ok(())
    }

    fn close(&mut self) {
        self.connected = false;
        self.hub.with(|s| s.closes += 1);
    }

    async fn send_command(
        &mut self,
        command: &str,
        terminator: Terminator,
    ) -> Result<String, IrHubError> {
        if !self.connected {
            return Err(io_error(io::ErrorKind::NotConnected));
        }
        let instance_id = self.instance_id;
        self.hub.with(|s| {
            s.sent.push((instance_id, command.to_string(), terminator));
            if s.failing_sends > 0 {
                s.failing_sends -= 1;
                return Err(io_error(io::ErrorKind::ConnectionReset));
            }
            if let Some(reply) = s.script.pop_front() {
                return Ok(reply);
            }
            Ok(s.answers
                .get(command)
                .cloned()
                .unwrap_or_else(|| "OK".to_string()))
        })
    }
}

#[derive(Default)]
struct DispatcherState {
    queries: Vec<String>,
    reply: Option<String>,
    health: Option<DispatcherHealth>,
}

/// Recording dispatcher. Replies `{"result":"success"}` unless told otherwise.
#[derive(Clone, Default)]
pub(crate) struct FakeDispatcher {
    state: Arc<Mutex<DispatcherState>>,
}

impl FakeDispatcher {
    pub(crate) fn reply_with(&self, body: &str) {
        self.state.lock().unwrap().reply = Some(body.to_string());
    }

    pub(crate) fn health_with(&self, health: DispatcherHealth) {
        self.state.lock().unwrap().health = Some(health);
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }
}

impl Dispatcher for FakeDispatcher {
    async fn press_key(&self, query: &str) -> Result<String, IrHubError> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(query.to_string());
        Ok(state
            .reply
            .clone()
            .unwrap_or_else(|| r#"{"result":"success"}"#.to_string()))
    }

    async fn health(&self) -> Result<DispatcherHealth, IrHubError> {
        self.state
            .lock()
            .unwrap()
            .health
            .clone()
            .ok_or_else(|| io_error(io::ErrorKind::ConnectionRefused))
    }
}
