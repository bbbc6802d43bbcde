//! 连接事件构建器
//! Connection event builder
//!
//! 在尝试开始时捕获起始时间，在尝试结束时捕获结束时间，并据此构建不可变事件。
//!
//! Captures the start instant when an attempt begins and the end instant when
//! it settles, then builds immutable events from what was captured.

use super::{ConnectDetails, ConnectionEvent, ConnectionEventContext, ConnectionEventName};
use crate::time::{TimeInstant, TimeProvider};

/// Collects the timing and metadata of a single attempt.
#[derive(Debug, Clone)]
pub struct ConnectEventBuilder {
    started_at: TimeInstant,
    ended_at: Option<TimeInstant>,
    original_country: String,
    provider_country: String,
    connect_details: ConnectDetails,
}

impl ConnectEventBuilder {
    /// Starts timing an attempt. The instant read here is both the attempt's
    /// `started_at` and the `created_at` of every event built from it.
    ///
    /// 开始为一次尝试计时。
    pub fn start(time: &dyn TimeProvider) -> Self {
        Self::started_at(time.now())
    }

    pub fn started_at(started_at: TimeInstant) -> Self {
        Self {
            started_at,
            ended_at: None,
            original_country: String::new(),
            provider_country: String::new(),
            connect_details: ConnectDetails::default(),
        }
    }

    pub fn with_connect_details(mut self, details: ConnectDetails) -> Self {
        self.connect_details = details;
        self
    }

    pub fn with_countries(
        mut self,
        original_country: impl Into<String>,
        provider_country: impl Into<String>,
    ) -> Self {
        self.original_country = original_country.into();
        self.provider_country = provider_country.into();
        self
    }

    pub fn set_original_country(&mut self, country: impl Into<String>) {
        self.original_country = country.into();
    }

    /// Stops timing. Only the first call reads the clock.
    ///
    /// 停止计时。只有第一次调用会读取时钟。
    pub fn finish(&mut self, time: &dyn TimeProvider) {
        if self.ended_at.is_none() {
            self.ended_at = Some(time.now());
        }
    }

    /// Builds an event from the captured data. Before [`finish`](Self::finish)
    /// the attempt is treated as zero-length.
    pub fn build(&self, name: ConnectionEventName, error: Option<String>) -> ConnectionEvent {
        let ended_at = self.ended_at.unwrap_or(self.started_at);
        let context = ConnectionEventContext::new(
            self.started_at,
            ended_at,
            self.original_country.clone(),
            self.provider_country.clone(),
            self.connect_details.clone(),
            error,
        );
        ConnectionEvent::new(name, context, self.started_at.utc_time)
    }
}
