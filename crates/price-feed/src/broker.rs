//! Broker last-traded-price source (Dhan v2 market quote API).
//!
//! `POST {base}/v2/quotes/ltp` with `{"<segment>": ["<security id>"]}` and an
//! `access-token` header. The broker allows one quote request per second, so
//! calls go through a governor rate limiter.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use rust_decimal::Decimal;
use scalper_core::{FeedConfig, FeedError, PriceSource};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::json::{decimal_from_json, json_body, map_transport};

/// Default Dhan API base URL.
pub const DHAN_API_URL: &str = "https://api.dhan.co";

const ACCESS_TOKEN_ENV: &str = "DHAN_ACCESS_TOKEN";
const CLIENT_ID_ENV: &str = "DHAN_CLIENT_ID";

/// Connection settings for [`BrokerQuoteSource`].
#[derive(Debug)]
pub struct BrokerQuoteConfig {
    pub base_url: String,
    pub access_token: SecretString,
    pub client_id: Option<String>,
    /// Exchange segment key, e.g. `NSE_EQ`.
    pub exchange_segment: String,
    /// Broker security id of the instrument (`13` is NIFTY 50).
    pub security_id: String,
    pub timeout_secs: u64,
}

impl BrokerQuoteConfig {
    /// Combines the feed section with credentials from the environment.
    ///
    /// # Errors
    ///
    /// `MissingCredential` if `DHAN_ACCESS_TOKEN` is unset or empty.
    pub fn from_env(feed: &FeedConfig) -> Result<Self, FeedError> {
        let access_token = std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or(FeedError::MissingCredential(ACCESS_TOKEN_ENV))?;
        let client_id = std::env::var(CLIENT_ID_ENV)
            .ok()
            .filter(|id| !id.trim().is_empty());

        Ok(Self {
            base_url: feed.broker_api_url.clone(),
            access_token: SecretString::from(access_token),
            client_id,
            exchange_segment: feed.exchange_segment.clone(),
            security_id: feed.security_id.clone(),
            timeout_secs: feed.timeout_secs,
        })
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct LtpEnvelope {
    status: Option<String>,
    #[serde(default)]
    data: Value,
}

pub struct BrokerQuoteSource {
    http: Client,
    config: BrokerQuoteConfig,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl BrokerQuoteSource {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: BrokerQuoteConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build broker HTTP client")?;

        Ok(Self {
            http,
            config,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(nonzero!(1u32)))),
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn fetch(&self) -> Result<Decimal, FeedError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/v2/quotes/ltp", self.config.base_url);
        let mut payload = Map::new();
        payload.insert(
            self.config.exchange_segment.clone(),
            json!([self.config.security_id]),
        );
        tracing::debug!(
            %url,
            segment = %self.config.exchange_segment,
            security_id = %self.config.security_id,
            "POST LTP"
        );

        let mut request = self
            .http
            .post(&url)
            .header("access-token", self.config.access_token.expose_secret())
            .header("Accept", "application/json")
            .json(&payload);
        if let Some(client_id) = &self.config.client_id {
            request = request.header("client-id", client_id);
        }

        let response = request.send().await.map_err(|e| map_transport(&e))?;
        let body = json_body(response).await?;
        self.parse_ltp(body)
    }

    fn parse_ltp(&self, body: Value) -> Result<Decimal, FeedError> {
        let envelope: LtpEnvelope =
            serde_json::from_value(body).map_err(|e| FeedError::Malformed(e.to_string()))?;

        match envelope.status.as_deref() {
            Some("success") => {}
            other => {
                return Err(FeedError::Malformed(format!(
                    "quote status {}",
                    other.unwrap_or("missing")
                )))
            }
        }

        let last_price = envelope
            .data
            .get(&self.config.exchange_segment)
            .and_then(|segment| segment.get(&self.config.security_id))
            .and_then(|quote| quote.get("last_price"))
            .ok_or_else(|| {
                FeedError::Malformed(format!(
                    "no last_price for {}/{}",
                    self.config.exchange_segment, self.config.security_id
                ))
            })?;

        decimal_from_json(last_price)
            .ok_or_else(|| FeedError::Malformed(format!("non-numeric last_price {last_price}")))
    }
}

#[async_trait]
impl PriceSource for BrokerQuoteSource {
    async fn spot_price(&self) -> Result<Decimal, FeedError> {
        self.fetch().await
    }

    fn name(&self) -> &str {
        "broker-ltp"
    }
}
