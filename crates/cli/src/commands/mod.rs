//! CLI commands for the scalping engine.

pub mod check_feed;
pub mod quote;
pub mod run;
pub mod show_config;

pub use check_feed::{run_check_feed, CheckFeedArgs};
pub use quote::{run_quote, QuoteArgs};
pub use run::{run_bot, RunArgs};
pub use show_config::show_config;
