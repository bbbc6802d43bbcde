//! Traits for abstracting over the tunnel control backend.
use crate::error::AdapterError;
use crate::state::{ConnectionStatus, Location};
use async_trait::async_trait;

/// An asynchronous interface to whatever actually brings the tunnel up and down.
///
/// This trait allows for abstracting over the underlying control API,
/// enabling mock implementations for testing or alternative backends.
///
/// 异步隧道控制接口。
///
/// 此trait允许对底层控制API进行抽象，从而可以为测试或其他后端自定义实现。
#[async_trait]
pub trait ConnectionAdapter: Send + Sync + 'static {
    /// Establishes a tunnel from `consumer_id` to `provider_id`.
    ///
    /// Returns an error of kind [`Cancelled`](crate::error::AdapterErrorKind::Cancelled)
    /// when the attempt was aborted before it settled.
    async fn connect(
        &self,
        consumer_id: &str,
        provider_id: &str,
        provider_country: &str,
    ) -> Result<(), AdapterError>;

    /// Tears the tunnel down.
    async fn disconnect(&self) -> Result<(), AdapterError>;

    /// Queries the backend's view of the connection status.
    async fn fetch_status(&self) -> Result<ConnectionStatus, AdapterError>;

    /// Queries the current public IP.
    async fn fetch_ip(&self) -> Result<String, AdapterError>;

    /// Queries the client's original location.
    /// 查询客户端的原始位置。
    async fn fetch_original_location(&self) -> Result<Location, AdapterError>;
}
