//! Capital allocation: lot sizing and the per-trade budget cap.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Lots per trade derived from a capital budget:
/// `floor(budget × utilization / (max_premium × lot_size))`, at least 1 and
/// at most `u32::MAX`.
#[must_use]
pub fn derive_lots(
    budget_capital: Decimal,
    utilization_fraction: Decimal,
    max_premium: Decimal,
    lot_size: u32,
) -> u32 {
    let lot_cost = max_premium * Decimal::from(lot_size);
    if lot_cost <= Decimal::ZERO {
        return 1;
    }
    let lots = (budget_capital * utilization_fraction / lot_cost).floor();
    if lots < Decimal::ONE {
        return 1;
    }
    lots.to_u32().unwrap_or(u32::MAX)
}

/// Result of checking one position's cost against the capital budget.
#[derive(Debug, PartialEq, Eq)]
pub enum AllocationCheck {
    Approved {
        remaining_capacity: Decimal,
    },
    Rejected {
        investment: Decimal,
        budget: Decimal,
    },
}

/// Rejects a position whose cost exceeds `capital × max_capital_fraction`.
#[must_use]
pub fn check_allocation(
    investment: Decimal,
    capital: Decimal,
    max_capital_fraction: Decimal,
) -> AllocationCheck {
    let budget = capital * max_capital_fraction;

    if investment > budget {
        AllocationCheck::Rejected { investment, budget }
    } else {
        AllocationCheck::Approved {
            remaining_capacity: budget - investment,
        }
    }
}
