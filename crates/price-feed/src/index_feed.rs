//! Generic JSON index feed.
//!
//! GETs a URL and reads the index level at a JSON pointer (RFC 6901), e.g.
//! `/price` or `/data/0/ltp`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use scalper_core::{FeedError, PriceSource};

use crate::json::{decimal_from_json, json_body, map_transport};

pub struct IndexFeedSource {
    http: Client,
    url: String,
    price_pointer: String,
}

impl IndexFeedSource {
    /// # Errors
    ///
    /// Fails if the pointer is not a valid JSON pointer or the HTTP client
    /// cannot be built.
    pub fn new(
        url: impl Into<String>,
        price_pointer: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let price_pointer = price_pointer.into();
        anyhow::ensure!(
            price_pointer.is_empty() || price_pointer.starts_with('/'),
            "price pointer must be empty or start with '/': {price_pointer}"
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build index feed HTTP client")?;

        Ok(Self {
            http,
            url: url.into(),
            price_pointer,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PriceSource for IndexFeedSource {
    async fn spot_price(&self) -> Result<Decimal, FeedError> {
        tracing::debug!(url = %self.url, "GET index level");

        let response = self
            .http
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| map_transport(&e))?;
        let body = json_body(response).await?;

        let value = body.pointer(&self.price_pointer).ok_or_else(|| {
            FeedError::Malformed(format!("nothing at {}", self.price_pointer))
        })?;
        decimal_from_json(value)
            .ok_or_else(|| FeedError::Malformed(format!("non-numeric price {value}")))
    }

    fn name(&self) -> &str {
        "index-feed"
    }
}
