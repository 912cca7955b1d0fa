//! Telegram Bot API sender.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scalper_core::{LifecycleEvent, NotificationSink, TelegramConfig};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::format::MessageFormatter;

/// Default Telegram Bot API base URL.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

const BOT_TOKEN_ENV: &str = "BOT_TOKEN";
const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

pub struct TelegramNotifier {
    http: Client,
    api_url: String,
    bot_token: SecretString,
    chat_id: String,
    formatter: MessageFormatter,
}

impl TelegramNotifier {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(
        bot_token: SecretString,
        chat_id: impl Into<String>,
        formatter: MessageFormatter,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .context("Failed to build Telegram HTTP client")?;

        Ok(Self {
            http,
            api_url: TELEGRAM_API_URL.to_string(),
            bot_token,
            chat_id: chat_id.into(),
            formatter,
        })
    }

    /// Reads `BOT_TOKEN` and `TELEGRAM_CHAT_ID` from the environment.
    ///
    /// Returns `Ok(None)` when either is unset, so a missing chat setup
    /// degrades to log-only notifications.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn from_env(
        config: &TelegramConfig,
        formatter: MessageFormatter,
    ) -> Result<Option<Self>> {
        let token = std::env::var(BOT_TOKEN_ENV).ok().filter(|v| !v.trim().is_empty());
        let chat_id = std::env::var(CHAT_ID_ENV).ok().filter(|v| !v.trim().is_empty());

        let (Some(token), Some(chat_id)) = (token, chat_id) else {
            tracing::warn!("Telegram enabled but BOT_TOKEN/TELEGRAM_CHAT_ID not set");
            return Ok(None);
        };

        Ok(Some(
            Self::new(SecretString::from(token), chat_id, formatter)?
                .with_api_url(config.api_url.clone()),
        ))
    }

    /// Sets a custom API base URL (useful for testing).
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Sends one HTML-formatted message.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx responses and `ok: false` replies.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_url,
            self.bot_token.expose_secret()
        );
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "HTML",
        });

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("Telegram request failed")?;

        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .with_context(|| format!("Telegram returned {status} with unreadable body"))?;

        if !body.ok {
            return Err(anyhow!(
                "Telegram rejected message ({status}): {}",
                body.description.unwrap_or_default()
            ));
        }

        tracing::debug!(chat_id = %self.chat_id, "Telegram message sent");
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn notify(&self, event: &LifecycleEvent) -> Result<()> {
        self.send_message(&self.formatter.format(event)).await
    }
}
