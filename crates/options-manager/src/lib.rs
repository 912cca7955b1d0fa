//! Deterministic intraday options scalping engine.
//!
//! Admits positions through a risk gate, picks strikes under a premium cap,
//! tracks them in a ledger and settles them on fixed-fraction exit rules.
//! [`TradingCycle`] ties the pieces together on a market-hours schedule.
//!
//! No pricing model and no order routing: premiums are estimated from a step
//! table and every fill is assumed.

pub mod allocation;
pub mod cycle;
pub mod exits;
pub mod ledger;
pub mod risk;
pub mod strikes;
pub mod types;

pub use cycle::{CycleOutcome, EngineSnapshot, MarketState, TradingCycle};
pub use exits::ExitEvaluator;
pub use ledger::{CapitalAccount, LedgerError, PositionLedger};
pub use risk::{GateState, RiskGate};
pub use strikes::{round_to_grid, PremiumTable, StrikeSelector};
pub use types::{DenyReason, SelectionRejection, Settlement, StrikeSelection};
