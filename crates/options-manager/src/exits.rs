//! Exit-trigger evaluation and fixed-fraction settlement.
//!
//! Triggers are evaluated in a fixed order where later checks override
//! earlier ones: directional move, then holding time, then market close.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use scalper_core::{Direction, ExitConfig, ExitReason, Position};

use crate::types::Settlement;

#[derive(Debug, Clone)]
pub struct ExitEvaluator {
    target_move_points: Decimal,
    stop_move_points: Decimal,
    max_hold: Duration,
    target_fraction: Decimal,
    stop_fraction: Decimal,
    residual_fraction: Decimal,
}

impl ExitEvaluator {
    #[must_use]
    pub fn from_config(config: &ExitConfig) -> Self {
        Self {
            target_move_points: config.target_move_points,
            stop_move_points: config.stop_move_points,
            max_hold: Duration::minutes(config.max_hold_minutes),
            target_fraction: config.target_fraction,
            stop_fraction: config.stop_fraction,
            residual_fraction: config.residual_fraction,
        }
    }

    /// Exit reason for `position` at `spot`, or `None` to keep holding.
    #[must_use]
    pub fn check(
        &self,
        position: &Position,
        spot: Decimal,
        now: DateTime<Utc>,
        market_open: bool,
    ) -> Option<ExitReason> {
        let favourable = match position.direction {
            Direction::Call => spot - position.spot_at_entry,
            Direction::Put => position.spot_at_entry - spot,
        };

        let mut reason = if favourable > self.target_move_points {
            Some(ExitReason::Target)
        } else if favourable < -self.stop_move_points {
            Some(ExitReason::StopLoss)
        } else {
            None
        };

        if position.held_for(now) > self.max_hold {
            reason = Some(ExitReason::TimeExit);
        }

        if !market_open {
            reason = Some(ExitReason::MarketClose);
        }

        reason
    }

    /// P&L factor applied to the entry premium for `reason`.
    #[must_use]
    pub fn factor(&self, reason: ExitReason) -> Decimal {
        match reason {
            ExitReason::Target => self.target_fraction,
            ExitReason::StopLoss => -self.stop_fraction,
            ExitReason::TimeExit | ExitReason::MarketClose => self.residual_fraction,
        }
    }

    /// `realized_pnl = factor × entry_premium × quantity`, with the exit
    /// premium implied by the same factor.
    #[must_use]
    pub fn settle(&self, position: &Position, reason: ExitReason) -> Settlement {
        let factor = self.factor(reason);
        Settlement {
            exit_premium: position.entry_premium * (Decimal::ONE + factor),
            realized_pnl: factor * position.entry_premium * Decimal::from(position.quantity),
        }
    }

    /// Premium levels quoted to the user when a position opens.
    #[must_use]
    pub fn reference_premiums(&self, entry_premium: Decimal) -> (Decimal, Decimal) {
        (
            entry_premium * (Decimal::ONE + self.target_fraction),
            entry_premium * (Decimal::ONE - self.stop_fraction),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use scalper_core::PositionStatus;

    fn evaluator() -> ExitEvaluator {
        ExitEvaluator::from_config(&ExitConfig {
            target_move_points: dec!(40),
            stop_move_points: dec!(25),
            max_hold_minutes: 30,
            target_fraction: dec!(0.20),
            stop_fraction: dec!(0.30),
            residual_fraction: dec!(0.05),
        })
    }

    fn entry_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-06T04:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn position(direction: Direction) -> Position {
        Position {
            id: 1,
            direction,
            strike: dec!(24100),
            spot_at_entry: dec!(24000),
            entry_time: entry_time(),
            lots: 1,
            quantity: 25,
            entry_premium: dec!(200),
            investment: dec!(5000),
            status: PositionStatus::Open,
            exit_reason: None,
            exit_premium: None,
            exit_time: None,
            realized_pnl: None,
        }
    }

    fn minutes(m: i64) -> DateTime<Utc> {
        entry_time() + Duration::minutes(m)
    }

    #[test]
    fn call_target_and_stop() {
        let e = evaluator();
        let p = position(Direction::Call);
        assert_eq!(e.check(&p, dec!(24041), minutes(5), true), Some(ExitReason::Target));
        assert_eq!(e.check(&p, dec!(24040), minutes(5), true), None);
        assert_eq!(e.check(&p, dec!(23974), minutes(5), true), Some(ExitReason::StopLoss));
        assert_eq!(e.check(&p, dec!(23975), minutes(5), true), None);
    }

    #[test]
    fn put_is_mirrored() {
        let e = evaluator();
        let p = position(Direction::Put);
        assert_eq!(e.check(&p, dec!(23959), minutes(5), true), Some(ExitReason::Target));
        assert_eq!(e.check(&p, dec!(24026), minutes(5), true), Some(ExitReason::StopLoss));
        assert_eq!(e.check(&p, dec!(24010), minutes(5), true), None);
    }

    #[test]
    fn time_exit_overrides_directional() {
        let e = evaluator();
        let p = position(Direction::Call);
        assert_eq!(e.check(&p, dec!(24100), minutes(31), true), Some(ExitReason::TimeExit));
        assert_eq!(e.check(&p, dec!(24000), minutes(30), true), None);
    }

    #[test]
    fn time_exit_counts_seconds_past_the_limit() {
        let e = evaluator();
        let p = position(Direction::Call);
        let limit = minutes(30);
        assert_eq!(e.check(&p, dec!(24000), limit, true), None);
        assert_eq!(
            e.check(&p, dec!(24000), limit + Duration::seconds(1), true),
            Some(ExitReason::TimeExit)
        );
        assert_eq!(
            e.check(&p, dec!(24000), limit + Duration::seconds(59), true),
            Some(ExitReason::TimeExit)
        );
    }

    #[test]
    fn market_close_overrides_everything() {
        let e = evaluator();
        let p = position(Direction::Call);
        assert_eq!(e.check(&p, dec!(24000), minutes(1), false), Some(ExitReason::MarketClose));
        assert_eq!(e.check(&p, dec!(24100), minutes(45), false), Some(ExitReason::MarketClose));
    }

    #[test]
    fn fixed_fraction_settlement() {
        let e = evaluator();
        let p = position(Direction::Call);

        let target = e.settle(&p, ExitReason::Target);
        assert_eq!(target.realized_pnl, dec!(1000));
        assert_eq!(target.exit_premium, dec!(240));

        let stop = e.settle(&p, ExitReason::StopLoss);
        assert_eq!(stop.realized_pnl, dec!(-1500));
        assert_eq!(stop.exit_premium, dec!(140));

        let time = e.settle(&p, ExitReason::TimeExit);
        assert_eq!(time.realized_pnl, dec!(250));
        assert_eq!(e.settle(&p, ExitReason::MarketClose), time);
    }

    #[test]
    fn reference_premiums_bracket_entry() {
        let (target, stop) = evaluator().reference_premiums(dec!(120));
        assert_eq!(target, dec!(144));
        assert_eq!(stop, dec!(84));
    }
}
