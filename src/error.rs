//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use thiserror::Error;

/// Distinguishes a genuine adapter failure from an aborted attempt.
///
/// 区分适配器的真正失败与被中止的尝试。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterErrorKind {
    /// The adapter could not complete the operation.
    /// 适配器无法完成操作。
    Failure,
    /// The user or the system aborted the operation mid-flight.
    /// 用户或系统在操作进行中将其中止。
    Cancelled,
}

/// An error reported by a [`ConnectionAdapter`](crate::adapter::ConnectionAdapter).
///
/// 由连接适配器报告的错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AdapterError {
    kind: AdapterErrorKind,
    message: String,
}

impl AdapterError {
    /// Creates a failure with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: AdapterErrorKind::Failure,
            message: message.into(),
        }
    }

    /// Creates a cancellation. 创建一个取消错误。
    pub fn cancelled() -> Self {
        Self {
            kind: AdapterErrorKind::Cancelled,
            message: "Connection cancelled".to_string(),
        }
    }

    pub fn kind(&self) -> AdapterErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == AdapterErrorKind::Cancelled
    }
}

/// The primary error type for the connection lifecycle library.
/// 连接生命周期库的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// An identity is already bound to this connection session.
    /// 此连接会话已绑定了一个身份。
    #[error("identity already set to {current}")]
    IdentityAlreadySet { current: String },

    /// A status string did not name a known connection status.
    /// 状态字符串不是已知的连接状态。
    #[error("unknown connection status: {0}")]
    InvalidStatus(String),
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;
