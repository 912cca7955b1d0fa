use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::position::Position;

/// A single spot observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

impl PriceSample {
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}

/// Trade hypothesis direction: `Call` expects a rise, `Put` expects a fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Call,
    Put,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CALL" | "CE" | "BUY CALL" => Ok(Self::Call),
            "PUT" | "PE" | "BUY PUT" => Ok(Self::Put),
            other => anyhow::bail!("Unknown direction: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalStrength {
    Moderate,
    Strong,
}

impl std::fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Moderate => write!(f, "MODERATE"),
            Self::Strong => write!(f, "STRONG"),
        }
    }
}

/// Where a signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalOrigin {
    /// Produced by the momentum detector over the price history.
    Momentum,
    /// Pushed in from outside (webhook / operator).
    External,
}

/// Directional trade hypothesis. Consumed once per cycle, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    pub reference_price: Decimal,
    pub strength: SignalStrength,
    pub origin: SignalOrigin,
}

/// Lifecycle notifications delivered to a `NotificationSink`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// A new position was admitted and opened.
    Opened {
        position: Position,
        target_premium: Decimal,
        stop_premium: Decimal,
    },

    /// A position was settled.
    Closed {
        position: Position,
        current_capital: Decimal,
        daily_pnl: Decimal,
    },

    /// A signal fired but no position was opened.
    Skipped {
        direction: Direction,
        spot: Decimal,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl LifecycleEvent {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Opened { .. } => "open",
            Self::Closed { .. } => "close",
            Self::Skipped { .. } => "skip",
        }
    }
}
