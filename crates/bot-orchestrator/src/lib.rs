//! Actor wrapper around the trading cycle.
//!
//! [`BotActor`] owns the [`TradingCycle`](scalper_options_manager::TradingCycle)
//! and is the only writer of ledger and capital state. Chat handlers, the CLI
//! and anything else talk to it through a cloneable [`BotHandle`].

pub mod bot_actor;
pub mod bot_handle;
pub mod commands;

pub use bot_actor::{BotActor, Clock};
pub use bot_handle::BotHandle;
pub use commands::{BotCommand, BotState, BotStatus};
