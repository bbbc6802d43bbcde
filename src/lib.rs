#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The root of the tunnel connection lifecycle library.
//! 隧道连接生命周期库的根。

pub mod adapter;
pub mod config;
pub mod error;
pub mod event;
pub mod manager;
pub mod state;
pub mod time;

#[cfg(test)]
mod testing;

pub use adapter::ConnectionAdapter;
pub use config::Config;
pub use error::{AdapterError, AdapterErrorKind, Error, Result};
pub use event::{ConnectDetails, ConnectionEvent, ConnectionEventContext, ConnectionEventName};
pub use manager::ConnectionManager;
pub use state::{ConnectionData, ConnectionStatus, Location};
pub use time::{SystemTimeProvider, TimeInstant, TimeProvider};
