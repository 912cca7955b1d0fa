use async_trait::async_trait;
use scalper_core::{LifecycleEvent, NotificationSink};
use tracing::info;

/// Writes lifecycle events to the tracing log. Always available.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, event: &LifecycleEvent) -> anyhow::Result<()> {
        match event {
            LifecycleEvent::Opened {
                position,
                target_premium,
                stop_premium,
            } => info!(
                id = position.id,
                contract = %position.contract_label(),
                premium = %position.entry_premium,
                quantity = position.quantity,
                target = %target_premium,
                stop = %stop_premium,
                "ENTRY"
            ),
            LifecycleEvent::Closed {
                position,
                current_capital,
                daily_pnl,
            } => info!(
                id = position.id,
                contract = %position.contract_label(),
                reason = ?position.exit_reason,
                pnl = ?position.realized_pnl,
                capital = %current_capital,
                daily_pnl = %daily_pnl,
                "EXIT"
            ),
            LifecycleEvent::Skipped {
                direction,
                spot,
                reason,
                ..
            } => info!(%direction, %spot, %reason, "SKIP"),
        }
        Ok(())
    }
}
