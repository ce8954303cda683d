//! Error types for emote variation generation.

use crate::result::FailureKind;
use std::time::Duration;

/// Guidance shown when the provider account has run out of credit.
pub const BILLING_GUIDANCE: &str = "Your OpenAI account has reached its billing limit. \
Review your plan and usage at https://platform.openai.com/account/billing, then try again.";

/// Warning shown when a batch is submitted without any uploads.
pub const NO_INPUT_WARNING: &str = "Please upload at least one emote to get started.";

/// Longest API error text kept in an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while generating variations.
#[derive(Debug, thiserror::Error)]
pub enum EmoteError {
    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Account billing or quota exhausted.
    #[error("billing limit reached: {0}")]
    Billing(String),

    /// API returned a structured error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code, when the service sent one.
        code: Option<String>,
        /// Human-readable message from the service.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}: {message}")]
    RateLimited {
        /// Delay suggested by the service.
        retry_after: Option<Duration>,
        /// Human-readable message from the service.
        message: String,
    },

    /// Request did not complete in time.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Upload is not one of the accepted encodings.
    #[error("unsupported image encoding for '{0}' (accepted: png, jpg)")]
    UnsupportedEncoding(String),

    /// Batch submitted with no uploads.
    #[error("{}", NO_INPUT_WARNING)]
    NoInput,

    /// Response did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., reading an upload or saving a result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EmoteError {
    /// Classifies this error into the per-item failure taxonomy.
    ///
    /// Billing exhaustion is its own kind. Every other rejection the service
    /// answered with a 4xx becomes `InvalidRequest`; transport problems,
    /// server faults and malformed responses are `Unexpected`.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Billing(_) => FailureKind::BillingLimitReached,
            Self::Auth(_)
            | Self::RateLimited { .. }
            | Self::ContentBlocked(_)
            | Self::InvalidRequest(_)
            | Self::UnsupportedEncoding(_) => FailureKind::InvalidRequest,
            Self::Api { status, .. } if (400..500).contains(status) => FailureKind::InvalidRequest,
            Self::Api { .. }
            | Self::Timeout(_)
            | Self::NoInput
            | Self::UnexpectedResponse(_)
            | Self::Network(_)
            | Self::Decode(_)
            | Self::Io(_)
            | Self::Json(_) => FailureKind::Unexpected,
        }
    }

    /// Returns the message a user should see for this error.
    ///
    /// Service rejections echo the service's own text, billing errors
    /// carry the fixed billing guidance, anything else is the full diagnostic.
    /// A rate limit with a `Retry-After` delay also says when to try again.
    pub fn user_message(&self) -> String {
        match self.failure_kind() {
            FailureKind::BillingLimitReached => BILLING_GUIDANCE.to_string(),
            FailureKind::InvalidRequest => match self {
                Self::RateLimited {
                    retry_after: Some(delay),
                    message,
                } => format!("{message} (try again in {}s)", delay.as_secs()),
                Self::Auth(m)
                | Self::ContentBlocked(m)
                | Self::InvalidRequest(m)
                | Self::RateLimited { message: m, .. }
                | Self::Api { message: m, .. } => m.clone(),
                other => other.to_string(),
            },
            FailureKind::Unexpected => self.to_string(),
        }
    }
}

/// Trims API error text to a single bounded line.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    truncated.push('…');
    truncated
}

/// Reads a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Result type alias for emote generation operations.
pub type Result<T> = std::result::Result<T, EmoteError>;
