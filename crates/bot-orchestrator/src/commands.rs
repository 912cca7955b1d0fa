use chrono::{DateTime, Utc};
use scalper_core::{Direction, Position};
use scalper_options_manager::EngineSnapshot;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Messages accepted by the [`BotActor`](crate::BotActor).
///
/// Every mutation of trading state goes through one of these, so the command
/// layer never touches the ledger directly.
#[derive(Debug)]
pub enum BotCommand {
    /// Sets the global enable switch.
    Enable,
    Disable,
    /// Queues an external CALL/PUT signal for the next cycle.
    InjectSignal(Direction),
    /// Zeroes daily P&L and re-anchors the loss limit.
    ResetDaily,
    GetStatus(oneshot::Sender<BotStatus>),
    GetPositions(oneshot::Sender<Vec<Position>>),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotState {
    Starting,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotStatus {
    pub bot_id: String,
    pub state: BotState,
    pub last_heartbeat: DateTime<Utc>,
    pub engine: EngineSnapshot,
}
