//! Outbound request wrapper.
//!
//! One reqwest client, built once from the configuration; every call attaches
//! the `Authorization: JWT <token>` header when the session holds an access
//! token and normalizes the outcome into [`ApiError`]. A `204`/empty body
//! resolves to `None`, not an error. The gateway never retries and never
//! refreshes tokens on its own.

use std::sync::Arc;

use reqwest::{Method, StatusCode, header};
use serde_json::Value;
use tracing::debug;

use crate::api::error::{ApiError, extract_detail};
use crate::auth::session::SessionContext;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// HTTP gateway with bearer-token authorization and failure normalization.
pub struct ApiGateway {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl ApiGateway {
    /// Create a gateway from the configuration and an injected session.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ClientConfig, session: Arc<SessionContext>) -> ClientResult<Self> {
        let client = Self::build_client(config)?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    /// Build an HTTP client with appropriate headers and settings.
    fn build_client(config: &ClientConfig) -> ClientResult<reqwest::Client> {
        use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|err| ClientError::InvalidConfig(format!("http client: {err}")))
    }

    /// Issue a JSON request.
    ///
    /// # Errors
    /// Returns an [`ApiError`] classifying transport, HTTP, and decode
    /// failures.
    pub async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError> {
        let url = self.endpoint(path);
        debug!("{method} {url}");
        let mut request = self.client.request(method, url);
        request = self.authorize(request);
        if let Some(body) = &body {
            request = request.json(body);
        }
        self.dispatch(request).await
    }

    /// Issue a multipart/form-data request (message sends).
    ///
    /// # Errors
    /// Returns an [`ApiError`] classifying transport, HTTP, and decode
    /// failures.
    pub async fn send_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Option<Value>, ApiError> {
        let url = self.endpoint(path);
        debug!("POST {url} (multipart)");
        let request = self.authorize(self.client.post(url)).multipart(form);
        self.dispatch(request).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.access_token() {
            Some(token) => request.header(header::AUTHORIZATION, format!("JWT {token}")),
            None => request,
        }
    }

    async fn dispatch(&self, request: reqwest::RequestBuilder) -> Result<Option<Value>, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|err| ApiError::NetworkFailure(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::NetworkFailure(err.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::HttpError {
                status: status.as_u16(),
                detail: extract_detail(status, &body),
            });
        }

        if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|err| ApiError::DecodeFailure(err.to_string()))
    }
}
