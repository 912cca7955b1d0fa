//! Spot price sources.
//!
//! Two HTTP-backed [`PriceSource`](scalper_core::PriceSource) implementations
//! and the [`PriceFeed`] wrapper that the trading cycle is given:
//!
//! - [`BrokerQuoteSource`]: broker last-traded-price endpoint (Dhan v2 LTP)
//! - [`IndexFeedSource`]: any JSON endpoint exposing the index level

pub mod broker;
pub mod feed;
pub mod index_feed;

mod json;

pub use broker::{BrokerQuoteConfig, BrokerQuoteSource, DHAN_API_URL};
pub use feed::PriceFeed;
pub use index_feed::IndexFeedSource;
