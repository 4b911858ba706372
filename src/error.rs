//! Error taxonomy for the HChat client.

use thiserror::Error;

use crate::api::error::ApiError;

/// Client error type surfaced to callers and, as a display string, to the store.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected locally, before any network call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication failed (HTTP 401 / invalid credentials).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The server answered with a non-success status and a decodable detail.
    #[error("server error ({status}): {detail}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Detail extracted from the response body.
        detail: String,
    },

    /// Transport-level failure (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Durable credential storage failed.
    #[error("credential storage error: {0}")]
    Storage(String),
}

/// Convenience result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Check if the failure is worth retrying by user action.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::Server {
                    status: 500..=599,
                    ..
                }
        )
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NetworkFailure(msg) => Self::Network(msg),
            ApiError::HttpError {
                status: 401,
                detail,
            } => Self::Auth(detail),
            ApiError::HttpError { status, detail } => Self::Server { status, detail },
            ApiError::DecodeFailure(msg) => Self::Decode(msg),
        }
    }
}
