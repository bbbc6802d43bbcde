//! Wall-clock abstraction used to time connection attempts.
//!
//! 用于为连接尝试计时的时钟抽象。

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

/// A single moment expressed in two clocks, in milliseconds.
///
/// 以两种时钟表示的同一时刻（毫秒）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInstant {
    /// Milliseconds since the Unix epoch, UTC.
    pub utc_time: i64,
    /// Milliseconds since the Unix epoch as read on the local wall clock.
    pub local_time: i64,
}

impl TimeInstant {
    pub const fn new(utc_time: i64, local_time: i64) -> Self {
        Self {
            utc_time,
            local_time,
        }
    }

    /// Elapsed local-clock milliseconds from `earlier` to `self`.
    pub fn local_delta_since(&self, earlier: &TimeInstant) -> i64 {
        self.local_time - earlier.local_time
    }
}

/// Supplies the current time.
///
/// 提供当前时间。实现必须没有读取时钟以外的副作用。
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> TimeInstant;
}

/// Reads the system clock through `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> TimeInstant {
        let utc = Utc::now();
        let local = Local::now().naive_local().and_utc();
        TimeInstant::new(utc.timestamp_millis(), local.timestamp_millis())
    }
}
