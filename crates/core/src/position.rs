use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::events::Direction;

pub type PositionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// Why a position was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    Target,
    StopLoss,
    TimeExit,
    MarketClose,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target => write!(f, "TARGET"),
            Self::StopLoss => write!(f, "STOPLOSS"),
            Self::TimeExit => write!(f, "TIME_EXIT"),
            Self::MarketClose => write!(f, "MARKET_CLOSE"),
        }
    }
}

/// A synthetic option position.
///
/// `quantity = lots × lot_size` and `investment = entry_premium × quantity`
/// are fixed at open time. Only the ledger mutates a position, and only once,
/// when it settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub direction: Direction,
    pub strike: Decimal,
    pub spot_at_entry: Decimal,
    pub entry_time: DateTime<Utc>,
    pub lots: u32,
    pub quantity: u32,
    pub entry_premium: Decimal,
    pub investment: Decimal,
    pub status: PositionStatus,
    pub exit_reason: Option<ExitReason>,
    pub exit_premium: Option<Decimal>,
    pub exit_time: Option<DateTime<Utc>>,
    pub realized_pnl: Option<Decimal>,
}

impl Position {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Time held as of `now`.
    #[must_use]
    pub fn held_for(&self, now: DateTime<Utc>) -> Duration {
        now - self.entry_time
    }

    /// Human-readable contract label, e.g. `24100 CE`.
    #[must_use]
    pub fn contract_label(&self) -> String {
        let suffix = match self.direction {
            Direction::Call => "CE",
            Direction::Put => "PE",
        };
        format!("{} {suffix}", self.strike.normalize())
    }
}
