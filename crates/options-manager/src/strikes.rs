//! Strike selection under a premium cap and capital budget.
//!
//! Premiums are not quoted; they come from a step function of the distance
//! between strike and spot. The function is a crude monotone proxy, not a
//! pricing model.

use rust_decimal::{Decimal, RoundingStrategy};
use scalper_core::{AppConfig, Direction, PremiumTier, Signal, StrikeConfig};

use crate::allocation::{check_allocation, derive_lots, AllocationCheck};
use crate::types::{SelectionRejection, StrikeSelection};

/// Step-function premium estimator.
#[derive(Debug, Clone)]
pub struct PremiumTable {
    tiers: Vec<PremiumTier>,
    floor: Decimal,
}

impl PremiumTable {
    /// `tiers` must be ascending by `max_distance`.
    #[must_use]
    pub fn new(tiers: Vec<PremiumTier>, floor: Decimal) -> Self {
        Self { tiers, floor }
    }

    #[must_use]
    pub fn from_config(config: &StrikeConfig) -> Self {
        Self::new(config.premium_tiers.clone(), config.floor_premium)
    }

    /// Premium of the first tier whose `max_distance` covers `distance`.
    #[must_use]
    pub fn estimate(&self, distance: Decimal) -> Decimal {
        let distance = distance.abs();
        self.tiers
            .iter()
            .find(|tier| distance <= tier.max_distance)
            .map_or(self.floor, |tier| tier.premium)
    }
}

/// Rounds `price` to the nearest multiple of `gap` (ties to even, like the
/// exchange strike ladder helpers).
#[must_use]
pub fn round_to_grid(price: Decimal, gap: Decimal) -> Decimal {
    if gap <= Decimal::ZERO {
        return price;
    }
    (price / gap).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven) * gap
}

#[derive(Debug, Clone)]
pub struct StrikeSelector {
    strike_gap: Decimal,
    /// Sorted ascending.
    candidate_distances: Vec<Decimal>,
    premiums: PremiumTable,
    max_premium: Decimal,
    lots_per_trade: u32,
    /// `lots_per_trade × lot_size`, saturated at `u32::MAX`.
    quantity: u32,
    max_capital_fraction: Decimal,
}

impl StrikeSelector {
    #[must_use]
    pub fn new(
        strike_gap: Decimal,
        mut candidate_distances: Vec<Decimal>,
        premiums: PremiumTable,
        max_premium: Decimal,
        lot_size: u32,
        lots_per_trade: u32,
        max_capital_fraction: Decimal,
    ) -> Self {
        candidate_distances.sort();
        let lots_per_trade = lots_per_trade.max(1);
        Self {
            strike_gap,
            candidate_distances,
            premiums,
            max_premium,
            lots_per_trade,
            quantity: lots_per_trade.saturating_mul(lot_size),
            max_capital_fraction,
        }
    }

    /// Builds the selector, deriving lots per trade from the starting
    /// capital when the configuration does not fix it.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let lots = config.risk.lots_per_trade.unwrap_or_else(|| {
            derive_lots(
                config.capital.starting_capital,
                config.risk.utilization_fraction,
                config.strikes.max_premium,
                config.instrument.lot_size,
            )
        });

        Self::new(
            config.instrument.strike_gap,
            config.strikes.candidate_distances.clone(),
            PremiumTable::from_config(&config.strikes),
            config.strikes.max_premium,
            config.instrument.lot_size,
            lots,
            config.risk.max_capital_fraction,
        )
    }

    /// Picks the nearest strike whose estimated premium fits under the cap,
    /// then checks the position's cost against the capital budget.
    ///
    /// # Errors
    ///
    /// `NoQualifyingStrike` if every candidate is too expensive,
    /// `BudgetExceeded` if the chosen position costs more than
    /// `capital × max_capital_fraction`.
    pub fn select(
        &self,
        signal: &Signal,
        spot: Decimal,
        capital: Decimal,
    ) -> Result<StrikeSelection, SelectionRejection> {
        let (distance, strike, premium) = self
            .candidate_distances
            .iter()
            .map(|&distance| {
                let raw = match signal.direction {
                    Direction::Call => spot + distance,
                    Direction::Put => spot - distance,
                };
                let strike = round_to_grid(raw, self.strike_gap);
                let premium = self.premiums.estimate(strike - spot);
                (distance, strike, premium)
            })
            .find(|(_, _, premium)| *premium <= self.max_premium)
            .ok_or(SelectionRejection::NoQualifyingStrike {
                max_premium: self.max_premium,
            })?;

        let quantity = self.quantity();
        let investment = premium * Decimal::from(quantity);

        match check_allocation(investment, capital, self.max_capital_fraction) {
            AllocationCheck::Rejected { investment, budget } => {
                Err(SelectionRejection::BudgetExceeded { investment, budget })
            }
            AllocationCheck::Approved { .. } => Ok(StrikeSelection {
                direction: signal.direction,
                spot,
                strike,
                distance,
                estimated_premium: premium,
                lots: self.lots_per_trade,
                quantity,
                investment,
            }),
        }
    }

    #[must_use]
    pub const fn lots_per_trade(&self) -> u32 {
        self.lots_per_trade
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }
}
