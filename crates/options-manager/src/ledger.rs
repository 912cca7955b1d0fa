//! Position ledger and capital account.
//!
//! The ledger is the authoritative record of open and closed positions and of
//! realized P&L. Positions go OPEN → CLOSED exactly once; a closed position
//! leaves the active set and lands in a bounded journal.

use std::collections::VecDeque;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use scalper_core::{
    DailyResetPolicy, ExitReason, Position, PositionId, PositionStatus, Signal,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Settlement, StrikeSelection};

const CLOSED_JOURNAL_LEN: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown position id {0}")]
    UnknownPosition(PositionId),
}

/// Running capital and P&L.
///
/// `current_capital = starting_capital + Σ realized_pnl`; `daily_pnl` is the
/// same sum restricted to the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalAccount {
    pub starting_capital: Decimal,
    pub current_capital: Decimal,
    pub daily_pnl: Decimal,
    /// Capital when the current session began; the loss-limit denominator.
    pub session_start_capital: Decimal,
    pub session_date: Option<NaiveDate>,
}

impl CapitalAccount {
    #[must_use]
    pub const fn new(starting_capital: Decimal) -> Self {
        Self {
            starting_capital,
            current_capital: starting_capital,
            daily_pnl: Decimal::ZERO,
            session_start_capital: starting_capital,
            session_date: None,
        }
    }

    fn apply(&mut self, realized_pnl: Decimal) {
        self.current_capital += realized_pnl;
        self.daily_pnl += realized_pnl;
    }

    /// Starts a new session: zero daily P&L, re-anchor the reference capital.
    pub fn reset_daily(&mut self, date: Option<NaiveDate>) {
        self.daily_pnl = Decimal::ZERO;
        self.session_start_capital = self.current_capital;
        self.session_date = date;
    }

    /// Applies the reset policy for the trading date `today`.
    ///
    /// Returns `true` if a reset happened.
    pub fn roll_session(&mut self, today: NaiveDate, policy: DailyResetPolicy) -> bool {
        match (policy, self.session_date) {
            (_, None) => {
                self.session_date = Some(today);
                false
            }
            (DailyResetPolicy::DateRollover, Some(date)) if date != today => {
                self.reset_daily(Some(today));
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn total_pnl(&self) -> Decimal {
        self.current_capital - self.starting_capital
    }
}

#[derive(Debug, Clone)]
pub struct PositionLedger {
    next_id: PositionId,
    active: Vec<Position>,
    closed: VecDeque<Position>,
    account: CapitalAccount,
    wins: usize,
    losses: usize,
}

impl PositionLedger {
    #[must_use]
    pub fn new(starting_capital: Decimal) -> Self {
        Self {
            next_id: 1,
            active: Vec::new(),
            closed: VecDeque::with_capacity(CLOSED_JOURNAL_LEN),
            account: CapitalAccount::new(starting_capital),
            wins: 0,
            losses: 0,
        }
    }

    /// Records a new OPEN position at the selection's estimated premium.
    pub fn open(
        &mut self,
        signal: &Signal,
        selection: &StrikeSelection,
        now: DateTime<Utc>,
    ) -> Position {
        let position = Position {
            id: self.next_id,
            direction: signal.direction,
            strike: selection.strike,
            spot_at_entry: selection.spot,
            entry_time: now,
            lots: selection.lots,
            quantity: selection.quantity,
            entry_premium: selection.estimated_premium,
            investment: selection.estimated_premium * Decimal::from(selection.quantity),
            status: PositionStatus::Open,
            exit_reason: None,
            exit_premium: None,
            exit_time: None,
            realized_pnl: None,
        };
        self.next_id += 1;

        tracing::info!(
            id = position.id,
            direction = %position.direction,
            strike = %position.strike,
            premium = %position.entry_premium,
            quantity = position.quantity,
            investment = %position.investment,
            "Position opened"
        );

        self.active.push(position.clone());
        position
    }

    /// Settles an OPEN position and books its P&L.
    ///
    /// Returns `Ok(Some(pnl))` on the first close and `Ok(None)` if the
    /// position was already closed, in which case nothing changes.
    ///
    /// # Errors
    ///
    /// `UnknownPosition` if the id was never issued by this ledger.
    pub fn close(
        &mut self,
        id: PositionId,
        reason: ExitReason,
        settlement: Settlement,
        now: DateTime<Utc>,
    ) -> Result<Option<Position>, LedgerError> {
        let Some(index) = self.active.iter().position(|p| p.id == id) else {
            if id > 0 && id < self.next_id {
                tracing::debug!(id, "Close ignored, position already settled");
                return Ok(None);
            }
            return Err(LedgerError::UnknownPosition(id));
        };

        let mut position = self.active.remove(index);
        position.status = PositionStatus::Closed;
        position.exit_reason = Some(reason);
        position.exit_premium = Some(settlement.exit_premium);
        position.exit_time = Some(now);
        position.realized_pnl = Some(settlement.realized_pnl);

        self.account.apply(settlement.realized_pnl);
        if settlement.realized_pnl > Decimal::ZERO {
            self.wins += 1;
        } else {
            self.losses += 1;
        }

        tracing::info!(
            id = position.id,
            %reason,
            pnl = %settlement.realized_pnl,
            capital = %self.account.current_capital,
            daily_pnl = %self.account.daily_pnl,
            "Position closed"
        );

        if self.closed.len() >= CLOSED_JOURNAL_LEN {
            self.closed.pop_front();
        }
        self.closed.push_back(position.clone());

        Ok(Some(position))
    }

    #[must_use]
    pub fn get(&self, id: PositionId) -> Option<&Position> {
        self.active.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn open_positions(&self) -> &[Position] {
        &self.active
    }

    #[must_use]
    pub fn open_ids(&self) -> Vec<PositionId> {
        self.active.iter().map(|p| p.id).collect()
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.active.len()
    }

    /// Most recent closed positions, oldest first.
    pub fn recent_closed(&self) -> impl Iterator<Item = &Position> {
        self.closed.iter()
    }

    #[must_use]
    pub const fn account(&self) -> &CapitalAccount {
        &self.account
    }

    pub fn account_mut(&mut self) -> &mut CapitalAccount {
        &mut self.account
    }

    #[must_use]
    pub const fn wins(&self) -> usize {
        self.wins
    }

    #[must_use]
    pub const fn losses(&self) -> usize {
        self.losses
    }
}
