use anyhow::{bail, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub instrument: InstrumentConfig,
    pub capital: CapitalConfig,
    pub risk: RiskConfig,
    pub signal: SignalConfig,
    pub strikes: StrikeConfig,
    pub exits: ExitConfig,
    pub schedule: ScheduleConfig,
    pub feed: FeedConfig,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    pub symbol: String,
    /// Exchange lot size (contracts per lot).
    pub lot_size: u32,
    /// Distance between listed strikes.
    pub strike_gap: Decimal,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            symbol: "NIFTY".to_string(),
            lot_size: 65,
            strike_gap: dec!(50),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalConfig {
    pub starting_capital: Decimal,
    /// Initial value of the runtime enable switch.
    pub global_enabled: bool,
}

impl Default for CapitalConfig {
    fn default() -> Self {
        Self {
            starting_capital: dec!(10000),
            global_enabled: true,
        }
    }
}

/// When the session's daily P&L goes back to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyResetPolicy {
    /// Only a restart (or an explicit reset command) clears it.
    #[default]
    Never,
    /// Cleared when the exchange-local date changes.
    DateRollover,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub max_concurrent_positions: usize,
    /// Fraction of session-start capital that may be lost before new trades stop.
    pub daily_loss_limit_fraction: Decimal,
    /// Largest fraction of current capital a single position may cost.
    pub max_capital_fraction: Decimal,
    /// Fixed lots per trade. When absent, derived once at startup.
    pub lots_per_trade: Option<u32>,
    /// Share of capital budgeted when deriving `lots_per_trade`.
    pub utilization_fraction: Decimal,
    pub daily_reset: DailyResetPolicy,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_concurrent_positions: 1,
            daily_loss_limit_fraction: dec!(0.15),
            max_capital_fraction: dec!(0.8),
            lots_per_trade: None,
            utilization_fraction: dec!(0.8),
            daily_reset: DailyResetPolicy::Never,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub history_capacity: usize,
    /// Minimum three-sample move (inclusive) for a signal.
    pub min_signal_points: Decimal,
    /// Moves strictly larger than this are STRONG.
    pub strong_signal_points: Decimal,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            history_capacity: 10,
            min_signal_points: dec!(10),
            strong_signal_points: dec!(30),
        }
    }
}

/// One step of the premium estimator: distances up to `max_distance`
/// are priced at `premium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumTier {
    pub max_distance: Decimal,
    pub premium: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeConfig {
    /// Candidate distances from spot, tried nearest first.
    pub candidate_distances: Vec<Decimal>,
    /// Ascending by `max_distance`, non-increasing by `premium`.
    pub premium_tiers: Vec<PremiumTier>,
    /// Premium for distances beyond the last tier.
    pub floor_premium: Decimal,
    pub max_premium: Decimal,
}

impl Default for StrikeConfig {
    fn default() -> Self {
        Self {
            candidate_distances: vec![
                dec!(50),
                dec!(100),
                dec!(150),
                dec!(200),
                dec!(250),
                dec!(300),
            ],
            premium_tiers: vec![
                PremiumTier { max_distance: dec!(50), premium: dec!(350) },
                PremiumTier { max_distance: dec!(100), premium: dec!(200) },
                PremiumTier { max_distance: dec!(150), premium: dec!(120) },
                PremiumTier { max_distance: dec!(200), premium: dec!(80) },
                PremiumTier { max_distance: dec!(250), premium: dec!(50) },
            ],
            floor_premium: dec!(30),
            max_premium: dec!(123),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitConfig {
    /// Favourable spot move (points) that books the target.
    pub target_move_points: Decimal,
    /// Adverse spot move (points) that triggers the stop.
    pub stop_move_points: Decimal,
    pub max_hold_minutes: i64,
    /// Assumed premium gain booked on TARGET.
    pub target_fraction: Decimal,
    /// Assumed premium loss booked on STOPLOSS.
    pub stop_fraction: Decimal,
    /// Assumed premium change booked on TIME_EXIT and MARKET_CLOSE.
    pub residual_fraction: Decimal,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            target_move_points: dec!(40),
            stop_move_points: dec!(25),
            max_hold_minutes: 30,
            target_fraction: dec!(0.30),
            stop_fraction: dec!(0.30),
            residual_fraction: dec!(0.05),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub poll_interval_secs: u64,
    pub backoff_secs: u64,
    pub closed_interval_secs: u64,
    /// IANA zone of the exchange.
    pub timezone: String,
    /// `HH:MM`, exchange-local.
    pub market_open: String,
    /// `HH:MM`, exchange-local.
    pub market_close: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            backoff_secs: 30,
            closed_interval_secs: 300,
            timezone: "Asia/Kolkata".to_string(),
            market_open: "09:15".to_string(),
            market_close: "15:30".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Broker last-traded-price endpoint (credentials from env).
    #[default]
    BrokerQuote,
    /// Any JSON endpoint exposing the index level.
    IndexFeed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub kind: FeedKind,
    pub broker_api_url: String,
    pub exchange_segment: String,
    pub security_id: String,
    pub index_url: Option<String>,
    /// JSON pointer to the price inside the index feed response.
    pub price_pointer: String,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            kind: FeedKind::BrokerQuote,
            broker_api_url: "https://api.dhan.co".to_string(),
            exchange_segment: "NSE_EQ".to_string(),
            security_id: "13".to_string(),
            index_url: None,
            price_pointer: "/price".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.telegram.org".to_string(),
        }
    }
}

fn check_fraction(name: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        bail!("{name} must be within [0, 1], got {value}");
    }
    Ok(())
}

impl AppConfig {
    /// Rejects configurations the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.instrument.lot_size == 0 {
            bail!("instrument.lot_size must be positive");
        }
        if self.instrument.strike_gap <= Decimal::ZERO {
            bail!("instrument.strike_gap must be positive");
        }
        if self.capital.starting_capital <= Decimal::ZERO {
            bail!("capital.starting_capital must be positive");
        }
        check_fraction("risk.daily_loss_limit_fraction", self.risk.daily_loss_limit_fraction)?;
        check_fraction("risk.max_capital_fraction", self.risk.max_capital_fraction)?;
        check_fraction("risk.utilization_fraction", self.risk.utilization_fraction)?;
        if let Some(lots) = self.risk.lots_per_trade {
            if lots == 0 {
                bail!("risk.lots_per_trade must be at least 1");
            }
            if lots.checked_mul(self.instrument.lot_size).is_none() {
                bail!(
                    "risk.lots_per_trade {lots} × instrument.lot_size {} overflows the order quantity",
                    self.instrument.lot_size
                );
            }
        }
        if self.signal.history_capacity < 3 {
            bail!(
                "signal.history_capacity must be at least 3, got {}",
                self.signal.history_capacity
            );
        }
        if self.strikes.candidate_distances.is_empty() {
            bail!("strikes.candidate_distances must not be empty");
        }
        if let Some(bad) = self
            .strikes
            .candidate_distances
            .iter()
            .find(|d| **d <= Decimal::ZERO)
        {
            bail!("strikes.candidate_distances must be positive, got {bad}");
        }
        if self.strikes.max_premium <= Decimal::ZERO {
            bail!("strikes.max_premium must be positive");
        }
        for pair in self.strikes.premium_tiers.windows(2) {
            if pair[1].max_distance <= pair[0].max_distance {
                bail!("strikes.premium_tiers must be ascending by max_distance");
            }
            if pair[1].premium > pair[0].premium {
                bail!("strikes.premium_tiers must be non-increasing by premium");
            }
        }
        if let Some(last) = self.strikes.premium_tiers.last() {
            if self.strikes.floor_premium > last.premium {
                bail!("strikes.floor_premium must not exceed the last tier premium");
            }
        }
        if self.exits.max_hold_minutes < 0 {
            bail!("exits.max_hold_minutes must not be negative");
        }
        for (name, secs) in [
            ("schedule.poll_interval_secs", self.schedule.poll_interval_secs),
            ("schedule.backoff_secs", self.schedule.backoff_secs),
            ("schedule.closed_interval_secs", self.schedule.closed_interval_secs),
        ] {
            if secs == 0 {
                bail!("{name} must be positive");
            }
        }
        if self.feed.kind == FeedKind::IndexFeed && self.feed.index_url.is_none() {
            bail!("feed.index_url is required for the index feed");
        }
        Ok(())
    }
}
