//! Token refresh endpoint client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use vitrine_session::{AccessToken, RefreshToken};

use crate::request::ApiRequest;
use crate::transport::{HttpTransport, TransportError};

/// Credentials returned by the refresh endpoint.
///
/// The server always returns a new access token and may rotate the refresh
/// token alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshedCredentials {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
}

/// Failure to exchange a refresh token for a new access token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// The endpoint rejected the refresh token (invalid or expired).
    #[error("refresh token rejected (status {status})")]
    Rejected { status: u16 },

    /// The refresh call itself never completed.
    #[error("refresh transport failure: {0}")]
    Transport(#[from] TransportError),
}

/// Exchanges a refresh token for fresh credentials.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &RefreshToken)
        -> Result<RefreshedCredentials, RefreshError>;
}

/// Refresher that calls the API's refresh endpoint over the shared transport.
///
/// The refresh call itself is sent unauthenticated: the refresh token in the
/// body is the credential.
pub struct HttpTokenRefresher {
    transport: Arc<dyn HttpTransport>,
    path: String,
}

impl HttpTokenRefresher {
    pub const DEFAULT_PATH: &'static str = "/auth/refresh";

    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_path(transport, Self::DEFAULT_PATH)
    }

    pub fn with_path(transport: Arc<dyn HttpTransport>, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<RefreshedCredentials, RefreshError> {
        let body = json!({ "refresh_token": refresh_token.as_str() });
        let request = ApiRequest::post(self.path.clone(), body);

        debug!(path = %self.path, "exchanging refresh token");
        let response = self.transport.send(&request, None).await?;

        if !response.is_success() {
            return Err(RefreshError::Rejected {
                status: response.status.as_u16(),
            });
        }

        Ok(response.json::<RefreshedCredentials>()?)
    }
}
