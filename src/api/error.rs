//! Failure normalization for the API gateway.

use reqwest::StatusCode;
use thiserror::Error;

/// Uniform error shape for outbound requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: the request never produced an HTTP response.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The server answered with a non-success status.
    #[error("http {status}: {detail}")]
    HttpError {
        /// HTTP status code.
        status: u16,
        /// Human-readable detail extracted from the response body.
        detail: String,
    },

    /// A success response carried a body that could not be decoded.
    #[error("decode failure: {0}")]
    DecodeFailure(String),
}

impl ApiError {
    /// Check if the failure is transient enough to retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkFailure(_)
                | Self::HttpError {
                    status: 500..=599,
                    ..
                }
        )
    }
}

/// Extract a human-readable detail from an HTTP error body.
///
/// Preference order: the JSON body's `detail` field, then `message`, then a
/// joined rendering of field-error maps (`field: a, b | other: c`), then the
/// raw string body, then the status line.
#[must_use]
pub fn extract_detail(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(serde_json::Value::as_str) {
            return detail.to_string();
        }
        if let Some(message) = value.get("message").and_then(serde_json::Value::as_str) {
            return message.to_string();
        }
        if let Some(map) = value.as_object()
            && !map.is_empty()
        {
            return map
                .iter()
                .map(|(field, errors)| format!("{field}: {}", render_errors(errors)))
                .collect::<Vec<_>>()
                .join(" | ");
        }
        if let Some(text) = value.as_str() {
            return text.to_string();
        }
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

fn render_errors(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .map(render_errors)
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
