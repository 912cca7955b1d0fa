//! Admission control for new positions.
//!
//! Checks, in order: open-position cap, daily loss limit, global enable
//! switch. The first failing check is reported.

use rust_decimal::Decimal;
use scalper_core::RiskConfig;

use crate::types::DenyReason;

/// Inputs the gate looks at. Built fresh by the caller for every query.
#[derive(Debug, Clone, Copy)]
pub struct GateState {
    pub open_positions: usize,
    pub daily_pnl: Decimal,
    /// Capital at session start (not live capital).
    pub reference_capital: Decimal,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct RiskGate {
    max_concurrent_positions: usize,
    daily_loss_limit_fraction: Decimal,
}

impl RiskGate {
    #[must_use]
    pub const fn new(max_concurrent_positions: usize, daily_loss_limit_fraction: Decimal) -> Self {
        Self {
            max_concurrent_positions,
            daily_loss_limit_fraction,
        }
    }

    #[must_use]
    pub const fn from_config(config: &RiskConfig) -> Self {
        Self::new(
            config.max_concurrent_positions,
            config.daily_loss_limit_fraction,
        )
    }

    /// Loss (as a negative P&L) at which new trades stop.
    #[must_use]
    pub fn loss_limit(&self, reference_capital: Decimal) -> Decimal {
        -(reference_capital * self.daily_loss_limit_fraction)
    }

    /// Pure admission query.
    ///
    /// # Errors
    ///
    /// Returns the first [`DenyReason`] that applies.
    pub fn allows(&self, state: &GateState) -> Result<(), DenyReason> {
        if state.open_positions >= self.max_concurrent_positions {
            return Err(DenyReason::MaxPositions);
        }

        if state.daily_pnl <= self.loss_limit(state.reference_capital) {
            return Err(DenyReason::LossLimit);
        }

        if !state.enabled {
            return Err(DenyReason::Disabled);
        }

        Ok(())
    }

    #[must_use]
    pub const fn max_concurrent_positions(&self) -> usize {
        self.max_concurrent_positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn gate() -> RiskGate {
        RiskGate::new(2, dec!(0.15))
    }

    fn state() -> GateState {
        GateState {
            open_positions: 0,
            daily_pnl: Decimal::ZERO,
            reference_capital: dec!(10000),
            enabled: true,
        }
    }

    #[test]
    fn allows_fresh_session() {
        assert_eq!(gate().allows(&state()), Ok(()));
    }

    #[test]
    fn denies_at_position_cap() {
        let s = GateState {
            open_positions: 2,
            ..state()
        };
        assert_eq!(gate().allows(&s), Err(DenyReason::MaxPositions));
    }

    #[test]
    fn loss_limit_denies_regardless_of_switch() {
        // limit = -1500
        let s = GateState {
            daily_pnl: dec!(-1600),
            enabled: false,
            ..state()
        };
        assert_eq!(gate().allows(&s), Err(DenyReason::LossLimit));
    }

    #[test]
    fn loss_limit_is_inclusive() {
        let s = GateState {
            daily_pnl: dec!(-1500),
            ..state()
        };
        assert_eq!(gate().allows(&s), Err(DenyReason::LossLimit));

        let s = GateState {
            daily_pnl: dec!(-1499.99),
            ..state()
        };
        assert_eq!(gate().allows(&s), Ok(()));
    }

    #[test]
    fn position_cap_checked_before_loss_limit() {
        let s = GateState {
            open_positions: 5,
            daily_pnl: dec!(-5000),
            enabled: false,
            ..state()
        };
        assert_eq!(gate().allows(&s), Err(DenyReason::MaxPositions));
    }

    #[test]
    fn disabled_switch_denies_last() {
        let s = GateState {
            enabled: false,
            ..state()
        };
        assert_eq!(gate().allows(&s), Err(DenyReason::Disabled));
    }
}
