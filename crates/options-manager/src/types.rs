//! Types shared across the scalping engine.

use rust_decimal::Decimal;
use scalper_core::Direction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of strike selection: the contract to open and its sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeSelection {
    pub direction: Direction,
    pub spot: Decimal,
    pub strike: Decimal,
    /// Candidate distance that produced this strike.
    pub distance: Decimal,
    pub estimated_premium: Decimal,
    pub lots: u32,
    pub quantity: u32,
    /// `estimated_premium × quantity`.
    pub investment: Decimal,
}

/// Why the risk gate refused a new position. First failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DenyReason {
    #[error("MAX_POSITIONS")]
    MaxPositions,
    #[error("LOSS_LIMIT")]
    LossLimit,
    #[error("DISABLED")]
    Disabled,
}

/// Why a signal that passed the risk gate still produced no position.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SelectionRejection {
    #[error("no strike within max premium {max_premium}")]
    NoQualifyingStrike { max_premium: Decimal },

    #[error("investment {investment} exceeds capital budget {budget}")]
    BudgetExceeded { investment: Decimal, budget: Decimal },
}

/// Fixed-fraction settlement of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub exit_premium: Decimal,
    pub realized_pnl: Decimal,
}
