//! HTTP transport seam.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use vitrine_session::AccessToken;

use crate::request::ApiRequest;

/// Fixed per-request timeout. A timed-out request is a network failure, not
/// an authentication failure, and is never retried by the gateway.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// A response that actually came back from the server, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_str(&self.body)
            .map_err(|e| TransportError::malformed(format!("invalid JSON body: {e}")))
    }
}

/// Transport-level failure: no usable response was received.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection failure, DNS failure, timeout — nothing came back.
    #[error("network failure: {0}")]
    Network(String),

    /// A response came back but its body could not be read or decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl TransportError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Sends one fully-built wire request.
///
/// Implementations return `Ok` for **any** HTTP status — business errors are
/// responses, not transport failures — and `Err` only when no response was
/// received.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&AccessToken>,
    ) -> Result<ApiResponse, TransportError>;
}

/// `reqwest`-backed transport with the fixed request timeout applied.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build a transport rooted at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&AccessToken>,
    ) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.clone(), &url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::malformed(e.to_string()))?;

        Ok(ApiResponse::new(status, body))
    }
}
