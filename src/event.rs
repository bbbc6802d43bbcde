//! 连接分析事件模块
//! Connection Analytics Event Module
//!
//! 该模块定义了描述每次连接尝试结果和耗时的分析事件，以及构建和发送这些事件的组件。
//!
//! This module defines the analytics events that describe the outcome and
//! timing of each connection attempt, together with the components that
//! build and send them.

pub mod builder;
pub mod sender;

pub use builder::ConnectEventBuilder;
pub use sender::{ChannelEventSender, EventSender, TracingEventSender};

use crate::time::TimeInstant;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the two endpoints of a connection attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectDetails {
    pub consumer_id: String,
    pub provider_id: String,
}

impl ConnectDetails {
    pub fn new(consumer_id: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            consumer_id: consumer_id.into(),
            provider_id: provider_id.into(),
        }
    }
}

/// 事件名称
/// Event names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionEventName {
    /// 连接成功
    /// Connect succeeded
    ConnectSuccessful,
    /// 连接失败
    /// Connect failed
    ConnectFailed,
    /// 连接被取消
    /// Connect canceled
    ConnectCanceled,
    /// 断开成功
    /// Disconnect succeeded
    DisconnectSuccessful,
    /// 断开失败
    /// Disconnect failed
    DisconnectFailed,
}

impl ConnectionEventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectSuccessful => "connect_successful",
            Self::ConnectFailed => "connect_failed",
            Self::ConnectCanceled => "connect_canceled",
            Self::DisconnectSuccessful => "disconnect_successful",
            Self::DisconnectFailed => "disconnect_failed",
        }
    }
}

impl fmt::Display for ConnectionEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing and metadata of one attempt.
///
/// 一次尝试的计时和元数据。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEventContext {
    pub started_at: TimeInstant,
    pub ended_at: TimeInstant,
    /// Local-clock milliseconds between `started_at` and `ended_at`.
    pub time_delta: i64,
    pub original_country: String,
    pub provider_country: String,
    pub connect_details: ConnectDetails,
    /// The adapter's message for failed attempts; `None` otherwise.
    pub error: Option<String>,
}

impl ConnectionEventContext {
    pub fn new(
        started_at: TimeInstant,
        ended_at: TimeInstant,
        original_country: impl Into<String>,
        provider_country: impl Into<String>,
        connect_details: ConnectDetails,
        error: Option<String>,
    ) -> Self {
        Self {
            started_at,
            ended_at,
            time_delta: ended_at.local_delta_since(&started_at),
            original_country: original_country.into(),
            provider_country: provider_country.into(),
            connect_details,
            error,
        }
    }
}

/// An immutable analytics event, created once per attempt.
///
/// 不可变的分析事件，每次尝试创建一次。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEvent {
    pub event_name: ConnectionEventName,
    pub context: ConnectionEventContext,
    pub created_at: i64,
}

impl ConnectionEvent {
    pub fn new(
        event_name: ConnectionEventName,
        context: ConnectionEventContext,
        created_at: i64,
    ) -> Self {
        Self {
            event_name,
            context,
            created_at,
        }
    }

    /// The analytics payload as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
