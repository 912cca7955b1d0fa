use std::str::FromStr;

use reqwest::Response;
use rust_decimal::Decimal;
use scalper_core::FeedError;
use serde_json::Value;

/// Reads a price from a JSON number or numeric string.
pub(crate) fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

pub(crate) fn map_transport(err: &reqwest::Error) -> FeedError {
    if err.is_timeout() {
        FeedError::Timeout
    } else {
        FeedError::Http(err.to_string())
    }
}

/// Fails non-2xx responses with their status and body, otherwise decodes JSON.
pub(crate) async fn json_body(response: Response) -> Result<Value, FeedError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FeedError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| FeedError::Malformed(e.to_string()))
}
