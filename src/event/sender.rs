//! Sinks for finished connection events.
//!
//! 已完成连接事件的接收端。

use super::ConnectionEvent;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Accepts built events and forwards them to an analytics sink.
///
/// Sending is fire-and-forget: the caller never waits for delivery and
/// implementations must not block.
///
/// 接收构建好的事件并转发到分析接收端。发送是即发即弃的。
pub trait EventSender: Send + Sync {
    fn send(&self, event: ConnectionEvent);
}

/// Writes each event's JSON payload to the `tunnel_lifecycle::analytics` log target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSender;

impl EventSender for TracingEventSender {
    fn send(&self, event: ConnectionEvent) {
        match event.to_json() {
            Ok(payload) => info!(
                target: "tunnel_lifecycle::analytics",
                event = %event.event_name,
                %payload,
                "Connection event"
            ),
            Err(e) => warn!(
                target: "tunnel_lifecycle::analytics",
                event = %event.event_name,
                error = %e,
                "Failed to serialize connection event"
            ),
        }
    }
}

/// Forwards events into an unbounded channel, for a transport task to drain.
///
/// 将事件转发到无界通道，由传输任务消费。
#[derive(Debug, Clone)]
pub struct ChannelEventSender {
    tx: mpsc::UnboundedSender<ConnectionEvent>,
}

impl ChannelEventSender {
    pub fn new(tx: mpsc::UnboundedSender<ConnectionEvent>) -> Self {
        Self { tx }
    }

    /// Creates a sender together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ConnectionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl EventSender for ChannelEventSender {
    fn send(&self, event: ConnectionEvent) {
        if let Err(e) = self.tx.send(event) {
            // Receiver gone: the event is dropped.
            debug!(event = %e.0.event_name, "Analytics channel closed, dropping event");
        }
    }
}
