//! Error types shared by price-feed collaborators.

use thiserror::Error;

/// Reasons a spot price could not be obtained.
///
/// The trading cycle treats every variant the same way: the price is
/// unavailable for this cycle.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success response from the quote endpoint.
    #[error("quote endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (possibly truncated).
        body: String,
    },

    /// The request did not complete within the feed timeout.
    #[error("quote request timed out")]
    Timeout,

    /// The response parsed but did not contain a usable price.
    #[error("malformed quote response: {0}")]
    Malformed(String),

    /// A required credential was not configured.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}
