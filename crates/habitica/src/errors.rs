//! Error types for the Habitica client.

use thiserror::Error;

/// Failures a single API call can surface. None of these are retried by the
/// client or the gate; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum HabiticaError {
    #[error("request to Habitica failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Habitica returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Habitica reported failure: {message}")]
    Api { message: String },

    #[error("failed to decode Habitica response: {reason}")]
    Decode { reason: String },

    #[error("invalid credential header value: {reason}")]
    Credentials { reason: String },
}

/// Result type for Habitica client operations
pub type HabiticaResult<T> = Result<T, HabiticaError>;
