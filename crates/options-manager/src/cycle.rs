//! The trading cycle: one pass of fetch → detect → admit → open → exit.
//!
//! `TradingCycle` owns every piece of mutable trading state. It is driven by a
//! single task (see the bot orchestrator), so nothing here is shared.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use scalper_core::{
    AppConfig, DailyResetPolicy, Direction, ExitReason, LifecycleEvent, MarketHours,
    NotificationSink, Position, PositionId, PriceSource, Signal, SignalOrigin, SignalStrength,
};
use scalper_signals::{PriceHistory, SignalDetector};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::exits::ExitEvaluator;
use crate::ledger::PositionLedger;
use crate::risk::{GateState, RiskGate};
use crate::strikes::StrikeSelector;
use crate::types::{DenyReason, SelectionRejection, Settlement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketState {
    MarketClosed,
    MarketOpen,
}

/// What happened during one `run_cycle` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleOutcome {
    pub timestamp: DateTime<Utc>,
    /// `None` when the price source was unavailable.
    pub spot: Option<Decimal>,
    pub signal: Option<Signal>,
    pub denied: Option<DenyReason>,
    pub skipped: Option<SelectionRejection>,
    pub opened: Option<Position>,
    pub closed: Vec<Position>,
}

impl CycleOutcome {
    fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            spot: None,
            signal: None,
            denied: None,
            skipped: None,
            opened: None,
            closed: Vec::new(),
        }
    }
}

/// Read-only view of the engine for status queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub enabled: bool,
    pub market_state: MarketState,
    pub last_price: Option<Decimal>,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub cycles: u64,
    pub starting_capital: Decimal,
    pub current_capital: Decimal,
    pub daily_pnl: Decimal,
    pub session_start_capital: Decimal,
    pub loss_limit: Decimal,
    pub lots_per_trade: u32,
    pub quantity: u32,
    pub wins: usize,
    pub losses: usize,
    pub open_positions: Vec<Position>,
    pub recent_closed: Vec<Position>,
}

pub struct TradingCycle {
    history: PriceHistory,
    detector: SignalDetector,
    gate: RiskGate,
    selector: StrikeSelector,
    ledger: PositionLedger,
    exits: ExitEvaluator,
    hours: MarketHours,
    source: Box<dyn PriceSource>,
    sink: Arc<dyn NotificationSink>,
    enabled: bool,
    pending_signal: Option<Direction>,
    market_state: MarketState,
    last_cycle_at: Option<DateTime<Utc>>,
    cycles: u64,
    daily_reset: DailyResetPolicy,
    poll_interval: Duration,
    backoff: Duration,
    closed_interval: Duration,
}

impl TradingCycle {
    /// Builds a cycle from configuration.
    ///
    /// # Errors
    ///
    /// Fails if the schedule section has an unknown timezone or malformed
    /// market hours.
    pub fn new(
        config: &AppConfig,
        source: Box<dyn PriceSource>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        let hours = MarketHours::from_config(&config.schedule)?;
        let selector = StrikeSelector::from_config(config);

        info!(
            symbol = %config.instrument.symbol,
            source = source.name(),
            capital = %config.capital.starting_capital,
            lots = selector.lots_per_trade(),
            quantity = selector.quantity(),
            max_premium = %config.strikes.max_premium,
            "Trading cycle initialised"
        );

        Ok(Self {
            history: PriceHistory::new(config.signal.history_capacity),
            detector: SignalDetector::from_config(&config.signal),
            gate: RiskGate::from_config(&config.risk),
            selector,
            ledger: PositionLedger::new(config.capital.starting_capital),
            exits: ExitEvaluator::from_config(&config.exits),
            hours,
            source,
            sink,
            enabled: config.capital.global_enabled,
            pending_signal: None,
            market_state: MarketState::MarketClosed,
            last_cycle_at: None,
            cycles: 0,
            daily_reset: config.risk.daily_reset,
            poll_interval: Duration::from_secs(config.schedule.poll_interval_secs),
            backoff: Duration::from_secs(config.schedule.backoff_secs),
            closed_interval: Duration::from_secs(config.schedule.closed_interval_secs),
        })
    }

    /// One scheduler tick. Returns how long to sleep before the next tick.
    ///
    /// Outside market hours no price is fetched, an injected signal is
    /// dropped, and any position still open is settled with `MARKET_CLOSE`.
    /// Failures never escape: they are logged and shorten the next sleep to
    /// the backoff interval.
    pub async fn step(&mut self, now: DateTime<Utc>) -> Duration {
        if !self.hours.is_open(now) {
            if self.market_state == MarketState::MarketOpen {
                info!("Market closed");
                self.market_state = MarketState::MarketClosed;
            }
            if let Some(direction) = self.pending_signal.take() {
                info!(%direction, "Market closed, discarding injected signal");
            }
            if self.ledger.open_count() > 0 {
                if let Err(e) = self.sweep_market_close(now).await {
                    error!(error = %e, "Market close sweep failed");
                    return self.backoff;
                }
            }
            return self.closed_interval;
        }

        if self.market_state == MarketState::MarketClosed {
            info!("Market open");
            self.market_state = MarketState::MarketOpen;
        }

        match self.run_cycle(now).await {
            Ok(outcome) => {
                debug!(
                    spot = ?outcome.spot,
                    opened = outcome.opened.is_some(),
                    closed = outcome.closed.len(),
                    "Cycle complete"
                );
                self.poll_interval
            }
            Err(e) => {
                error!(error = %e, "Trading cycle failed");
                self.backoff
            }
        }
    }

    /// Runs one full cycle at `now`.
    ///
    /// A position opened here is not exit-checked until the next cycle.
    ///
    /// # Errors
    ///
    /// Returns an error for inconsistent input (a non-positive price) or
    /// ledger failures. An unavailable price is not an error: the cycle is
    /// skipped and the outcome has no spot.
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> Result<CycleOutcome> {
        let mut outcome = CycleOutcome::empty(now);
        self.cycles += 1;
        self.last_cycle_at = Some(now);

        let today = self.hours.trading_date(now);
        if self.ledger.account_mut().roll_session(today, self.daily_reset) {
            info!(%today, "New session, daily P&L reset");
        }

        let spot = match self.source.spot_price().await {
            Ok(spot) => spot,
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "Price unavailable, skipping cycle");
                return Ok(outcome);
            }
        };
        ensure!(spot > Decimal::ZERO, "non-positive spot price {spot}");
        outcome.spot = Some(spot);

        self.history.record(now, spot);
        let market_open = self.hours.is_open(now);
        let prior_ids = self.ledger.open_ids();

        let signal = match self.pending_signal.take() {
            Some(direction) => Some(Signal {
                direction,
                reference_price: spot,
                strength: SignalStrength::Moderate,
                origin: SignalOrigin::External,
            }),
            None => self.detector.evaluate(&self.history),
        };

        if let Some(signal) = signal {
            info!(
                direction = %signal.direction,
                strength = %signal.strength,
                origin = ?signal.origin,
                %spot,
                "Signal"
            );
            outcome.signal = Some(signal);
            if market_open {
                self.admit(&signal, spot, now, &mut outcome).await;
            }
        }

        for id in prior_ids {
            if let Some(position) = self.try_exit(id, spot, now, market_open).await? {
                outcome.closed.push(position);
            }
        }

        Ok(outcome)
    }

    async fn admit(
        &mut self,
        signal: &Signal,
        spot: Decimal,
        now: DateTime<Utc>,
        outcome: &mut CycleOutcome,
    ) {
        let account = self.ledger.account();
        let state = GateState {
            open_positions: self.ledger.open_count(),
            daily_pnl: account.daily_pnl,
            reference_capital: account.session_start_capital,
            enabled: self.enabled,
        };

        if let Err(reason) = self.gate.allows(&state) {
            info!(%reason, daily_pnl = %state.daily_pnl, open = state.open_positions, "Admission denied");
            outcome.denied = Some(reason);
            return;
        }

        let selection = match self.selector.select(signal, spot, account.current_capital) {
            Ok(selection) => selection,
            Err(rejection) => {
                info!(%rejection, direction = %signal.direction, %spot, "No position opened");
                self.notify(LifecycleEvent::Skipped {
                    direction: signal.direction,
                    spot,
                    reason: rejection.to_string(),
                    timestamp: now,
                })
                .await;
                outcome.skipped = Some(rejection);
                return;
            }
        };

        let position = self.ledger.open(signal, &selection, now);
        let (target_premium, stop_premium) = self.exits.reference_premiums(position.entry_premium);
        self.notify(LifecycleEvent::Opened {
            position: position.clone(),
            target_premium,
            stop_premium,
        })
        .await;
        outcome.opened = Some(position);
    }

    async fn try_exit(
        &mut self,
        id: PositionId,
        spot: Decimal,
        now: DateTime<Utc>,
        market_open: bool,
    ) -> Result<Option<Position>> {
        let Some(position) = self.ledger.get(id) else {
            return Ok(None);
        };
        let Some(reason) = self.exits.check(position, spot, now, market_open) else {
            return Ok(None);
        };
        let settlement = self.exits.settle(position, reason);
        self.settle(id, reason, settlement, now).await
    }

    async fn settle(
        &mut self,
        id: PositionId,
        reason: ExitReason,
        settlement: Settlement,
        now: DateTime<Utc>,
    ) -> Result<Option<Position>> {
        let Some(closed) = self.ledger.close(id, reason, settlement, now)? else {
            return Ok(None);
        };
        let account = self.ledger.account();
        let event = LifecycleEvent::Closed {
            position: closed.clone(),
            current_capital: account.current_capital,
            daily_pnl: account.daily_pnl,
        };
        self.notify(event).await;
        Ok(Some(closed))
    }

    /// Settles every open position with `MARKET_CLOSE` at the last seen
    /// price (or the entry spot if no price was ever recorded).
    ///
    /// # Errors
    ///
    /// Propagates ledger failures.
    pub async fn sweep_market_close(&mut self, now: DateTime<Utc>) -> Result<Vec<Position>> {
        let last_price = self.history.latest_price();
        let mut closed = Vec::new();

        for id in self.ledger.open_ids() {
            let Some(position) = self.ledger.get(id) else {
                continue;
            };
            let spot = last_price.unwrap_or(position.spot_at_entry);
            let reason = self
                .exits
                .check(position, spot, now, false)
                .unwrap_or(ExitReason::MarketClose);
            let settlement = self.exits.settle(position, reason);
            if let Some(position) = self.settle(id, reason, settlement, now).await? {
                closed.push(position);
            }
        }

        if !closed.is_empty() {
            info!(count = closed.len(), "Market close sweep settled positions");
        }
        Ok(closed)
    }

    async fn notify(&self, event: LifecycleEvent) {
        if let Err(e) = self.sink.notify(&event).await {
            warn!(kind = event.kind(), error = %e, "Notification failed");
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!(enabled, "Global trading switch changed");
        }
        self.enabled = enabled;
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues an externally supplied signal for the next open-market cycle.
    /// It still has to pass the risk gate.
    pub fn inject_signal(&mut self, direction: Direction) {
        info!(%direction, "External signal queued");
        self.pending_signal = Some(direction);
    }

    /// Zeroes daily P&L and re-anchors the loss limit on current capital.
    pub fn reset_daily(&mut self, now: DateTime<Utc>) {
        let today = self.hours.trading_date(now);
        self.ledger.account_mut().reset_daily(Some(today));
        info!(%today, "Daily P&L reset");
    }

    #[must_use]
    pub fn open_positions(&self) -> Vec<Position> {
        self.ledger.open_positions().to_vec()
    }

    #[must_use]
    pub const fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn history(&self) -> &PriceHistory {
        &self.history
    }

    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        let account = self.ledger.account();
        EngineSnapshot {
            enabled: self.enabled,
            market_state: self.market_state,
            last_price: self.history.latest_price(),
            last_cycle_at: self.last_cycle_at,
            cycles: self.cycles,
            starting_capital: account.starting_capital,
            current_capital: account.current_capital,
            daily_pnl: account.daily_pnl,
            session_start_capital: account.session_start_capital,
            loss_limit: self.gate.loss_limit(account.session_start_capital),
            lots_per_trade: self.selector.lots_per_trade(),
            quantity: self.selector.quantity(),
            wins: self.ledger.wins(),
            losses: self.ledger.losses(),
            open_positions: self.open_positions(),
            recent_closed: self.ledger.recent_closed().cloned().collect(),
        }
    }
}
