//! 状态与IP轮询任务
//! Status and IP polling task

use super::ManagerInner;
use crate::adapter::ConnectionAdapter;
use crate::state::ConnectionStatus;
use std::sync::Weak;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{trace, warn};

/// Owns the polling task. Dropping it aborts the task.
///
/// 拥有轮询任务，销毁时中止该任务。
#[derive(Debug)]
pub(crate) struct Poller {
    id: u64,
    task: JoinHandle<()>,
}

impl Poller {
    pub(crate) fn new(id: u64, task: JoinHandle<()>) -> Self {
        Self { id, task }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The outcome of one poll. `None` fields leave the state untouched.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct PollResult {
    /// Transition generation observed before the status was fetched.
    pub(crate) generation: u64,
    pub(crate) status: Option<ConnectionStatus>,
    pub(crate) ip: Option<String>,
}

/// Queries the adapter once. Status is only resolved when an identity is set;
/// failed queries are logged and yield `None`.
///
/// 查询适配器一次。只有设置了身份才会查询状态；失败的查询被记录并返回 `None`。
pub(crate) async fn poll_once(
    adapter: &dyn ConnectionAdapter,
    has_identity: bool,
    generation: u64,
) -> PollResult {
    let status = if has_identity {
        match adapter.fetch_status().await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(error = %e, "Failed to fetch connection status");
                None
            }
        }
    } else {
        None
    };

    let ip = match adapter.fetch_ip().await {
        Ok(ip) => Some(ip),
        Err(e) => {
            warn!(error = %e, "Failed to fetch IP");
            None
        }
    };

    PollResult {
        generation,
        status,
        ip,
    }
}

/// Spawns the polling loop. The task holds only a weak reference to the
/// manager so that dropping every handle ends it.
pub(crate) fn spawn(inner: Weak<ManagerInner>, id: u64, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(inner) = inner.upgrade() else {
                break;
            };
            trace!(poller = id, "Polling connection state");

            let generation = inner.transition_generation();
            let result = poll_once(inner.adapter.as_ref(), inner.has_identity(), generation).await;
            if !inner.apply_poll(id, result) {
                break;
            }
        }
    })
}
