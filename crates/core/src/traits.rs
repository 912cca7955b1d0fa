use crate::error::FeedError;
use crate::events::LifecycleEvent;
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Latest traded price of the underlying.
///
/// Implementations enforce their own short timeout; any failure is reported
/// as a `FeedError` and means "unavailable" to the caller.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn spot_price(&self) -> Result<Decimal, FeedError>;
    fn name(&self) -> &str;
}

/// Fire-and-forget receiver of position lifecycle events.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: &LifecycleEvent) -> Result<()>;
}
