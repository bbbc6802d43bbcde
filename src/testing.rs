//! 测试辅助工具模块
//! Test utilities module

#![cfg(test)]

use crate::adapter::ConnectionAdapter;
use crate::config::Config;
use crate::error::AdapterError;
use crate::event::{ConnectionEvent, EventSender};
use crate::manager::ConnectionManager;
use crate::state::{ConnectionStatus, Location};
use crate::time::{TimeInstant, TimeProvider};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

pub const MOCK_IP: &str = "100.101.102.103";
pub const MOCK_ORIGINAL_COUNTRY: &str = "lt";
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// An adapter whose behaviour is switched by flags.
#[derive(Debug)]
pub struct MockConnectionAdapter {
    pub throw_connect_error: AtomicBool,
    pub throw_connect_cancelled_error: AtomicBool,
    pub throw_disconnect_error: AtomicBool,
    pub throw_disconnect_cancelled_error: AtomicBool,
    pub throw_status_error: AtomicBool,
    pub throw_ip_error: AtomicBool,
    pub throw_location_error: AtomicBool,
    pub status: Mutex<ConnectionStatus>,
    pub ip: Mutex<String>,
    /// When set, `fetch_ip` parks until the notify fires.
    pub ip_gate: Mutex<Option<Arc<Notify>>>,
    pub status_calls: AtomicUsize,
    pub ip_calls: AtomicUsize,
    pub connect_calls: Mutex<Vec<(String, String, String)>>,
}

impl Default for MockConnectionAdapter {
    fn default() -> Self {
        Self {
            throw_connect_error: AtomicBool::new(false),
            throw_connect_cancelled_error: AtomicBool::new(false),
            throw_disconnect_error: AtomicBool::new(false),
            throw_disconnect_cancelled_error: AtomicBool::new(false),
            throw_status_error: AtomicBool::new(false),
            throw_ip_error: AtomicBool::new(false),
            throw_location_error: AtomicBool::new(false),
            status: Mutex::new(ConnectionStatus::Connected),
            ip: Mutex::new(MOCK_IP.to_string()),
            ip_gate: Mutex::new(None),
            status_calls: AtomicUsize::new(0),
            ip_calls: AtomicUsize::new(0),
            connect_calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ConnectionAdapter for MockConnectionAdapter {
    async fn connect(
        &self,
        consumer_id: &str,
        provider_id: &str,
        provider_country: &str,
    ) -> Result<(), AdapterError> {
        self.connect_calls.lock().push((
            consumer_id.to_string(),
            provider_id.to_string(),
            provider_country.to_string(),
        ));
        if self.throw_connect_cancelled_error.load(Ordering::SeqCst) {
            return Err(AdapterError::cancelled());
        }
        if self.throw_connect_error.load(Ordering::SeqCst) {
            return Err(AdapterError::failure("Connection failed"));
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), AdapterError> {
        if self.throw_disconnect_cancelled_error.load(Ordering::SeqCst) {
            return Err(AdapterError::cancelled());
        }
        if self.throw_disconnect_error.load(Ordering::SeqCst) {
            return Err(AdapterError::failure("Disconnection failed"));
        }
        Ok(())
    }

    async fn fetch_status(&self) -> Result<ConnectionStatus, AdapterError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.throw_status_error.load(Ordering::SeqCst) {
            return Err(AdapterError::failure("Status unavailable"));
        }
        Ok(*self.status.lock())
    }

    async fn fetch_ip(&self) -> Result<String, AdapterError> {
        self.ip_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.ip_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.throw_ip_error.load(Ordering::SeqCst) {
            return Err(AdapterError::failure("IP unavailable"));
        }
        Ok(self.ip.lock().clone())
    }

    async fn fetch_original_location(&self) -> Result<Location, AdapterError> {
        if self.throw_location_error.load(Ordering::SeqCst) {
            return Err(AdapterError::failure("Location unavailable"));
        }
        Ok(Location::new(MOCK_ORIGINAL_COUNTRY))
    }
}

/// Returns 1, 2, 3, ... in both clocks.
#[derive(Debug, Default)]
pub struct MockTimeProvider {
    current: AtomicI64,
}

impl MockTimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> i64 {
        self.current.load(Ordering::SeqCst)
    }
}

impl TimeProvider for MockTimeProvider {
    fn now(&self) -> TimeInstant {
        let t = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        TimeInstant::new(t, t)
    }
}

/// Records every event it is handed.
#[derive(Debug, Default)]
pub struct MockEventSender {
    events: Mutex<Vec<ConnectionEvent>>,
}

impl MockEventSender {
    pub fn events(&self) -> Vec<ConnectionEvent> {
        self.events.lock().clone()
    }

    pub fn sent_event(&self) -> Option<ConnectionEvent> {
        self.events.lock().last().cloned()
    }
}

impl EventSender for MockEventSender {
    fn send(&self, event: ConnectionEvent) {
        self.events.lock().push(event);
    }
}

/// A manager wired to fresh mocks.
pub struct TestHarness {
    pub connection: ConnectionManager,
    pub adapter: Arc<MockConnectionAdapter>,
    pub sender: Arc<MockEventSender>,
    pub time: Arc<MockTimeProvider>,
}

impl TestHarness {
    pub fn new() -> Self {
        let adapter = Arc::new(MockConnectionAdapter::default());
        let sender = Arc::new(MockEventSender::default());
        let time = Arc::new(MockTimeProvider::new());
        let connection = ConnectionManager::new(
            adapter.clone(),
            time.clone(),
            sender.clone(),
            Config::with_poll_interval(POLL_INTERVAL),
        );
        Self {
            connection,
            adapter,
            sender,
            time,
        }
    }
}

/// Lets spawned tasks run and virtual time advance by one millisecond.
pub async fn next_tick() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
