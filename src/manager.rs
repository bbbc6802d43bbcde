//! 连接管理器模块
//! Connection Manager Module
//!
//! 该模块负责轮询隧道状态和IP、针对适配器执行连接与断开操作、
//! 对结果进行分类，并为每次尝试构建和发送分析事件。
//!
//! This module polls the tunnel status and IP, executes connect and disconnect
//! against the adapter, classifies the outcomes, and builds and sends an
//! analytics event for every attempt.

mod polling;


use crate::{
    adapter::ConnectionAdapter,
    config::Config,
    error::{AdapterError, AdapterErrorKind, Error, Result},
    event::{ConnectDetails, ConnectEventBuilder, ConnectionEvent, ConnectionEventName, EventSender},
    state::{ConnectionData, ConnectionStatus},
    time::TimeProvider,
};
use parking_lot::Mutex;
use polling::{PollResult, Poller};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{Instrument, debug, info, info_span, trace, warn};

/// What the last connect attempt was about; reused for the disconnect event.
///
/// 上一次连接尝试的上下文，断开事件会复用它。
#[derive(Debug, Clone, Default)]
struct AttemptInfo {
    details: ConnectDetails,
    original_country: String,
    provider_country: String,
}

/// Shared state behind every [`ConnectionManager`] handle.
pub(crate) struct ManagerInner {
    adapter: Arc<dyn ConnectionAdapter>,
    time: Arc<dyn TimeProvider>,
    sender: Arc<dyn EventSender>,
    config: Config,
    /// 单写者（管理器）、多读者的连接状态。
    /// Single-writer (the manager), multi-reader connection state.
    state: watch::Sender<ConnectionData>,
    /// The active polling task, if any. Poll results are applied while this
    /// lock is held and only by the registered poller.
    poller: Mutex<Option<Poller>>,
    next_poller_id: AtomicU64,
    /// Bumped on every local status transition; a poll started before a
    /// transition must not overwrite it.
    /// 每次本地状态转换时递增。
    transitions: AtomicU64,
    last_attempt: Mutex<Option<AttemptInfo>>,
}

impl ManagerInner {
    /// Sets the status and returns the one it replaced.
    fn transition(&self, status: ConnectionStatus) -> ConnectionStatus {
        let mut previous = status;
        self.state.send_modify(|data| {
            self.transitions.fetch_add(1, Ordering::SeqCst);
            previous = data.status;
            data.status = status;
        });
        if previous != status {
            debug!(from = %previous, to = %status, "Connection status changed");
        }
        previous
    }

    fn transition_generation(&self) -> u64 {
        self.transitions.load(Ordering::SeqCst)
    }

    fn has_identity(&self) -> bool {
        self.state.borrow().identity_id.is_some()
    }

    /// Applies one poll result if `poller_id` is still the registered poller.
    /// Returns `false` when the poller has been replaced or stopped. The
    /// polled status is dropped if a transition happened since it was read.
    ///
    /// 仅当 `poller_id` 仍是已注册的轮询器时才应用轮询结果。
    fn apply_poll(&self, poller_id: u64, result: PollResult) -> bool {
        let poller = self.poller.lock();
        if poller.as_ref().map(Poller::id) != Some(poller_id) {
            return false;
        }

        self.state.send_if_modified(|data| {
            let mut changed = false;
            let current = self.transitions.load(Ordering::SeqCst);
            let status = result.status.filter(|_| result.generation == current);
            if status.is_none() && result.status.is_some() {
                trace!(polled = ?result.status, "Discarding status read before a transition");
            }
            if let Some(status) = status {
                if data.status != status {
                    debug!(from = %data.status, to = %status, "Polled connection status");
                    data.status = status;
                    changed = true;
                }
            }
            if let Some(ip) = result.ip {
                if data.ip.as_deref() != Some(ip.as_str()) {
                    data.ip = Some(ip);
                    changed = true;
                }
            }
            changed
        });
        true
    }

    async fn original_country(&self) -> String {
        match self.adapter.fetch_original_location().await {
            Ok(location) => location.country,
            Err(e) => {
                warn!(error = %e, "Failed to fetch original location");
                String::new()
            }
        }
    }

    async fn run_connect(&self, details: ConnectDetails, provider_country: String) {
        let mut tracker = ConnectEventBuilder::start(self.time.as_ref())
            .with_connect_details(details.clone())
            .with_countries(String::new(), provider_country.clone());

        let original_country = self.original_country().await;
        tracker.set_original_country(original_country.clone());

        let result = self
            .adapter
            .connect(&details.consumer_id, &details.provider_id, &provider_country)
            .await;
        tracker.finish(self.time.as_ref());

        *self.last_attempt.lock() = Some(AttemptInfo {
            details: details.clone(),
            original_country,
            provider_country,
        });

        let event = self.settle_connect(&tracker, &details, result);
        self.sender.send(event);
    }

    fn settle_connect(
        &self,
        tracker: &ConnectEventBuilder,
        details: &ConnectDetails,
        result: std::result::Result<(), AdapterError>,
    ) -> ConnectionEvent {
        match result {
            Ok(()) => {
                self.transition(ConnectionStatus::Connected);
                info!(provider = %details.provider_id, "Connected");
                tracker.build(ConnectionEventName::ConnectSuccessful, None)
            }
            Err(e) => match e.kind() {
                AdapterErrorKind::Cancelled => {
                    self.transition(ConnectionStatus::NotConnected);
                    info!(provider = %details.provider_id, "Connect canceled");
                    tracker.build(ConnectionEventName::ConnectCanceled, None)
                }
                AdapterErrorKind::Failure => {
                    self.transition(ConnectionStatus::NotConnected);
                    warn!(provider = %details.provider_id, error = %e, "Connect failed");
                    tracker.build(
                        ConnectionEventName::ConnectFailed,
                        Some(e.message().to_string()),
                    )
                }
            },
        }
    }

    async fn run_disconnect(&self, previous: ConnectionStatus) {
        let attempt = self.last_attempt.lock().clone().unwrap_or_default();
        let mut tracker = ConnectEventBuilder::start(self.time.as_ref())
            .with_connect_details(attempt.details)
            .with_countries(attempt.original_country, attempt.provider_country);

        let result = self.adapter.disconnect().await;
        tracker.finish(self.time.as_ref());

        let event = match result {
            Ok(()) => {
                self.transition(ConnectionStatus::NotConnected);
                info!("Disconnected");
                tracker.build(ConnectionEventName::DisconnectSuccessful, None)
            }
            Err(e) => {
                self.transition(previous);
                warn!(error = %e, restored = %previous, "Disconnect failed");
                tracker.build(
                    ConnectionEventName::DisconnectFailed,
                    Some(e.message().to_string()),
                )
            }
        };
        self.sender.send(event);
    }
}

/// Drives the tunnel lifecycle and reports every attempt to analytics.
///
/// Handles are cheap to clone and share the same state. Dropping the last
/// handle stops polling.
///
/// 驱动隧道生命周期并向分析系统报告每次尝试。句柄克隆开销很小且共享同一状态。
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<ManagerInner>,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.data();
        let updating = self.is_updating();
        f.debug_struct("ConnectionManager")
            .field("data", &data)
            .field("updating", &updating)
            .field("config", &self.inner.config)
            .finish()
    }
}

impl ConnectionManager {
    pub fn new(
        adapter: Arc<dyn ConnectionAdapter>,
        time: Arc<dyn TimeProvider>,
        sender: Arc<dyn EventSender>,
        config: Config,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionData::default());
        Self {
            inner: Arc::new(ManagerInner {
                adapter,
                time,
                sender,
                config,
                state,
                poller: Mutex::new(None),
                next_poller_id: AtomicU64::new(1),
                transitions: AtomicU64::new(0),
                last_attempt: Mutex::new(None),
            }),
        }
    }

    /// A snapshot of the current connection data.
    ///
    /// 当前连接数据的快照。
    pub fn data(&self) -> ConnectionData {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to every change of the connection data.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionData> {
        self.inner.state.subscribe()
    }

    /// Binds the identity used to resolve the polled status.
    ///
    /// Setting the identity that is already bound is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdentityAlreadySet`] if a different identity is bound.
    pub fn set_identity(&self, identity_id: impl Into<String>) -> Result<()> {
        let identity_id = identity_id.into();
        let mut outcome = Ok(());
        self.inner.state.send_if_modified(|data| {
            if let Some(current) = data.identity_id.as_ref() {
                if *current != identity_id {
                    outcome = Err(Error::IdentityAlreadySet {
                        current: current.clone(),
                    });
                }
                return false;
            }
            debug!(identity = %identity_id, "Identity set");
            data.identity_id = Some(identity_id);
            true
        });
        outcome
    }

    /// Starts polling the adapter. The first poll fires immediately.
    ///
    /// Returns `false` without doing anything if polling is already running.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    ///
    /// 开始轮询适配器。如果轮询已在运行，则不做任何事并返回 `false`。
    pub fn start_updating(&self) -> bool {
        let mut poller = self.inner.poller.lock();
        if poller.is_some() {
            debug!("Polling already running");
            return false;
        }

        let id = self.inner.next_poller_id.fetch_add(1, Ordering::Relaxed);
        let task = polling::spawn(
            Arc::downgrade(&self.inner),
            id,
            self.inner.config.polling.interval,
        );
        *poller = Some(Poller::new(id, task));
        debug!(poller = id, interval = ?self.inner.config.polling.interval, "Polling started");
        true
    }

    /// Stops polling. Safe to call when polling was never started.
    ///
    /// No poll result is applied after this returns, even one already in flight.
    ///
    /// 停止轮询。返回后不会再应用任何轮询结果。
    pub fn stop_updating(&self) {
        let poller = self.inner.poller.lock().take();
        if let Some(poller) = poller {
            debug!(poller = poller.id(), "Polling stopped");
        }
    }

    pub fn is_updating(&self) -> bool {
        self.inner.poller.lock().is_some()
    }

    /// Connects to `provider_id` on behalf of `consumer_id`.
    ///
    /// The status becomes [`ConnectionStatus::Connecting`] before this returns.
    /// The attempt runs on its own task; the returned future resolves once the
    /// attempt has settled and its event was sent. Dropping the future does
    /// not cancel the attempt. Every outcome is reported as exactly one
    /// `connect_*` event, never as an error.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    ///
    /// 在返回之前状态即变为 `Connecting`；连接尝试在独立任务中运行，
    /// 丢弃返回的 future 不会取消该尝试。
    pub fn connect(
        &self,
        consumer_id: &str,
        provider_id: &str,
        provider_country: &str,
    ) -> impl Future<Output = ()> + Send + use<> {
        self.inner.transition(ConnectionStatus::Connecting);

        let inner = Arc::clone(&self.inner);
        let details = ConnectDetails::new(consumer_id, provider_id);
        let provider_country = provider_country.to_string();
        let span = info_span!(
            "connect",
            consumer = %details.consumer_id,
            provider = %details.provider_id,
        );
        let attempt = tokio::spawn(
            async move { inner.run_connect(details, provider_country).await }.instrument(span),
        );
        async move {
            if let Err(e) = attempt.await {
                warn!(error = %e, "Connect task ended abnormally");
            }
        }
    }

    /// Disconnects the tunnel.
    ///
    /// The status becomes [`ConnectionStatus::Disconnecting`] before this
    /// returns. On failure the status held before the call is restored. Like
    /// [`connect`](Self::connect), the attempt runs on its own task and the
    /// future never fails.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn disconnect(&self) -> impl Future<Output = ()> + Send + use<> {
        let previous = self.inner.transition(ConnectionStatus::Disconnecting);

        let inner = Arc::clone(&self.inner);
        let attempt = tokio::spawn(
            async move { inner.run_disconnect(previous).await }.instrument(info_span!("disconnect")),
        );
        async move {
            if let Err(e) = attempt.await {
                warn!(error = %e, "Disconnect task ended abnormally");
            }
        }
    }
}
