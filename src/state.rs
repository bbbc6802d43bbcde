//! Defines the observable connection state.
//!
//! 定义可观察的连接状态。

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The status of the tunnel connection.
/// 隧道连接的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// No tunnel is up.
    /// 没有活动的隧道。
    #[default]
    NotConnected,
    /// A connect attempt is in flight.
    /// 连接尝试正在进行中。
    Connecting,
    /// The tunnel is established.
    /// 隧道已建立。
    Connected,
    /// A disconnect is in flight.
    /// 断开连接正在进行中。
    Disconnecting,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotConnected => "NotConnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Disconnecting => "Disconnecting",
        }
    }

    /// Whether this is one of the intermediate states of an attempt.
    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Connecting | Self::Disconnecting)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NotConnected" => Ok(Self::NotConnected),
            "Connecting" => Ok(Self::Connecting),
            "Connected" => Ok(Self::Connected),
            "Disconnecting" => Ok(Self::Disconnecting),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }
}

/// The latest known identity, status and public IP.
///
/// Only the [`ConnectionManager`](crate::manager::ConnectionManager) writes this;
/// observers read snapshots of it.
///
/// 最新已知的身份、状态和公网IP。只有连接管理器会写入；观察者读取其快照。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    pub identity_id: Option<String>,
    pub status: ConnectionStatus,
    /// The IP reported by the last successful poll.
    #[serde(rename = "IP")]
    pub ip: Option<String>,
}

/// The client's original location, as seen before any tunnel is up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub country: String,
}

impl Location {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
        }
    }
}
