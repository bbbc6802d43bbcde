//! 定义了连接管理器的可配置参数。
//! Defines configurable parameters for the connection manager.

use std::time::Duration;

/// A structure containing all configurable parameters for a connection manager.
///
/// 包含连接管理器所有可配置参数的结构体。
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Status and IP polling parameters.
    /// 状态和IP轮询参数。
    pub polling: PollingConfig,
}

/// Status and IP polling parameters.
///
/// 状态和IP轮询参数。
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// The period between two polls of the adapter. The first poll fires
    /// immediately when updating starts.
    ///
    /// 两次轮询适配器之间的间隔。开始更新时第一次轮询立即触发。
    pub interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Returns a config that polls with the given interval.
    pub fn with_poll_interval(interval: Duration) -> Self {
        Self {
            polling: PollingConfig { interval },
        }
    }
}
