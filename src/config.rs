//! Configuration for the HChat client.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Environment variable overriding the API base URL.
const BASE_URL_ENV: &str = "HCHAT_API_BASE_URL";

/// Top-level configuration for the client engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing path.
    pub base_url: String,
    /// Total timeout for a single request.
    pub request_timeout: Duration,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// Placeholder title assigned to conversations created on demand.
    pub default_title: String,
    /// Placeholder description assigned to conversations created on demand.
    pub default_description: String,
    /// Minimum resident message count before the automatic title kicks in.
    pub auto_title_min_messages: usize,
    /// Maximum length, in characters, of the automatically derived title.
    pub auto_title_max_chars: usize,
    /// Path of the durable credential record.
    pub credentials_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            default_title: "Nueva Conversación".to_string(),
            default_description: "Esta es una nueva conversación".to_string(),
            auto_title_min_messages: 2,
            auto_title_max_chars: 20,
            credentials_path: PathBuf::from("hchat_session.json"),
        }
    }
}

impl ClientConfig {
    /// Build a configuration from the environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var(BASE_URL_ENV)
            && !base_url.trim().is_empty()
        {
            config.base_url = base_url;
        }
        config
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ClientResult<()> {
        Url::parse(&self.base_url)
            .map_err(|err| ClientError::InvalidConfig(format!("base_url: {err}")))?;

        if self.default_title.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "default_title must not be empty".to_string(),
            ));
        }

        if self.auto_title_min_messages == 0 {
            return Err(ClientError::InvalidConfig(
                "auto_title_min_messages must be > 0".to_string(),
            ));
        }

        if self.auto_title_max_chars == 0 {
            return Err(ClientError::InvalidConfig(
                "auto_title_max_chars must be > 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(ClientError::InvalidConfig(
                "timeouts must be > 0".to_string(),
            ));
        }

        if self.credentials_path.as_os_str().is_empty() {
            return Err(ClientError::InvalidConfig(
                "credentials_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ClientError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_title_rejected() {
        let config = ClientConfig {
            default_title: "   ".to_string(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ClientConfig {
            request_timeout: Duration::ZERO,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_auto_title_length_rejected() {
        let config = ClientConfig {
            auto_title_max_chars: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
