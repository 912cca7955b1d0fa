//! The price source handed to the trading cycle.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use scalper_core::{FeedConfig, FeedError, FeedKind, PriceSource};

use crate::broker::{BrokerQuoteConfig, BrokerQuoteSource};
use crate::index_feed::IndexFeedSource;

/// Configured price source. The cycle sees only [`PriceSource`]; which feed
/// backs it is decided here, once, from configuration.
pub enum PriceFeed {
    Broker(Box<BrokerQuoteSource>),
    Index(IndexFeedSource),
}

impl PriceFeed {
    /// Builds the feed selected by `config.kind`.
    ///
    /// # Errors
    ///
    /// Fails on missing broker credentials, a missing index URL, or an HTTP
    /// client that cannot be built.
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        match config.kind {
            FeedKind::BrokerQuote => {
                let broker = BrokerQuoteConfig::from_env(config)
                    .context("Broker quote feed needs credentials")?;
                Ok(Self::Broker(Box::new(BrokerQuoteSource::new(broker)?)))
            }
            FeedKind::IndexFeed => {
                let url = config
                    .index_url
                    .as_deref()
                    .context("feed.index_url is required for the index feed")?;
                Ok(Self::Index(IndexFeedSource::new(
                    url,
                    config.price_pointer.clone(),
                    config.timeout_secs,
                )?))
            }
        }
    }
}

#[async_trait]
impl PriceSource for PriceFeed {
    async fn spot_price(&self) -> Result<Decimal, FeedError> {
        match self {
            Self::Broker(source) => source.spot_price().await,
            Self::Index(source) => source.spot_price().await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Broker(source) => source.name(),
            Self::Index(source) => source.name(),
        }
    }
}
