//! Three-sample momentum detector.
//!
//! Fires when the last three spot samples move in the same direction twice in
//! a row and the total move reaches a minimum size.

use rust_decimal::Decimal;
use scalper_core::{Direction, Signal, SignalConfig, SignalOrigin, SignalStrength};

use crate::history::PriceHistory;

const WINDOW: usize = 3;

#[derive(Debug, Clone)]
pub struct SignalDetector {
    /// Minimum |total| move, inclusive.
    min_signal_points: Decimal,
    /// |total| strictly above this is STRONG.
    strong_signal_points: Decimal,
}

impl SignalDetector {
    #[must_use]
    pub const fn new(min_signal_points: Decimal, strong_signal_points: Decimal) -> Self {
        Self {
            min_signal_points,
            strong_signal_points,
        }
    }

    #[must_use]
    pub const fn from_config(config: &SignalConfig) -> Self {
        Self::new(config.min_signal_points, config.strong_signal_points)
    }

    /// Evaluates the most recent window. `None` with fewer than three samples.
    #[must_use]
    pub fn evaluate(&self, history: &PriceHistory) -> Option<Signal> {
        let window = history.last_n(WINDOW)?;
        let (p0, p1, p2) = (window[0].price, window[1].price, window[2].price);

        let move1 = p1 - p0;
        let move2 = p2 - p1;
        let total = p2 - p0;

        let direction = if move1 > Decimal::ZERO
            && move2 > Decimal::ZERO
            && total >= self.min_signal_points
        {
            Direction::Call
        } else if move1 < Decimal::ZERO
            && move2 < Decimal::ZERO
            && total.abs() >= self.min_signal_points
        {
            Direction::Put
        } else {
            return None;
        };

        let strength = if total.abs() > self.strong_signal_points {
            SignalStrength::Strong
        } else {
            SignalStrength::Moderate
        };

        tracing::debug!(%direction, %strength, %move1, %move2, %total, "Momentum signal");

        Some(Signal {
            direction,
            reference_price: p2,
            strength,
            origin: SignalOrigin::Momentum,
        })
    }
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self::from_config(&SignalConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn history_of(prices: &[Decimal]) -> PriceHistory {
        let mut history = PriceHistory::new(10);
        for (i, price) in prices.iter().enumerate() {
            let ts = DateTime::<Utc>::from_timestamp(1_736_136_000 + i as i64 * 60, 0).unwrap();
            history.record(ts, *price);
        }
        history
    }

    fn detector(min: Decimal) -> SignalDetector {
        SignalDetector::new(min, dec!(30))
    }

    #[test]
    fn rising_window_gives_moderate_call() {
        let signal = detector(dec!(2))
            .evaluate(&history_of(&[dec!(100), dec!(101), dec!(103)]))
            .unwrap();
        assert_eq!(signal.direction, Direction::Call);
        assert_eq!(signal.strength, SignalStrength::Moderate);
        assert_eq!(signal.reference_price, dec!(103));
        assert_eq!(signal.origin, SignalOrigin::Momentum);
    }

    #[test]
    fn falling_window_gives_put() {
        let signal = detector(dec!(10))
            .evaluate(&history_of(&[dec!(24050), dec!(24040), dec!(24030)]))
            .unwrap();
        assert_eq!(signal.direction, Direction::Put);
        assert_eq!(signal.strength, SignalStrength::Moderate);
    }

    #[test]
    fn large_move_is_strong() {
        let signal = detector(dec!(10))
            .evaluate(&history_of(&[dec!(24000), dec!(24020), dec!(24031)]))
            .unwrap();
        assert_eq!(signal.strength, SignalStrength::Strong);

        // exactly 30 stays moderate
        let signal = detector(dec!(10))
            .evaluate(&history_of(&[dec!(24000), dec!(24020), dec!(24030)]))
            .unwrap();
        assert_eq!(signal.strength, SignalStrength::Moderate);
    }

    #[test]
    fn threshold_is_inclusive() {
        let d = detector(dec!(3));
        assert!(d.evaluate(&history_of(&[dec!(100), dec!(101), dec!(103)])).is_some());
        assert!(d
            .evaluate(&history_of(&[dec!(100), dec!(101), dec!(102.99)]))
            .is_none());
        assert!(d
            .evaluate(&history_of(&[dec!(103), dec!(102), dec!(100)]))
            .is_some());
    }

    #[test]
    fn mixed_moves_give_nothing() {
        let d = detector(dec!(1));
        assert!(d.evaluate(&history_of(&[dec!(100), dec!(110), dec!(105)])).is_none());
        assert!(d.evaluate(&history_of(&[dec!(100), dec!(100), dec!(120)])).is_none());
    }

    #[test]
    fn fewer_than_three_samples_give_nothing() {
        let d = detector(dec!(0));
        assert!(d.evaluate(&history_of(&[])).is_none());
        assert!(d.evaluate(&history_of(&[dec!(100), dec!(200)])).is_none());
    }

    #[test]
    fn only_latest_window_counts() {
        // strong rally earlier, flat now
        let d = detector(dec!(5));
        let history = history_of(&[dec!(100), dec!(150), dec!(200), dec!(200), dec!(200)]);
        assert!(d.evaluate(&history).is_none());
    }
}
