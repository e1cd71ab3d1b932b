//! Credential storage.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::credentials::{AccessToken, CredentialPair, RefreshToken};

/// Error from a credential store backend.
///
/// The in-memory store never fails; platform-backed stores (encrypted
/// keychains etc.) surface their I/O failures through this.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("credential store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Process-wide credential state for one client session.
///
/// Writes must be atomic with respect to reads: a request that attaches its
/// token after a refresh completed has to observe the refreshed token, never
/// a stale one.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn access_token(&self) -> Result<Option<AccessToken>, StoreError>;

    async fn set_access_token(&self, token: AccessToken) -> Result<(), StoreError>;

    async fn refresh_token(&self) -> Result<Option<RefreshToken>, StoreError>;

    async fn set_refresh_token(&self, token: RefreshToken) -> Result<(), StoreError>;

    /// Store both tokens in one atomic write (login / full rotation).
    async fn set_pair(&self, pair: CredentialPair) -> Result<(), StoreError>;

    /// Remove both tokens (logout). Clearing an empty store is a no-op.
    async fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct Credentials {
    access: Option<AccessToken>,
    refresh: Option<RefreshToken>,
}

/// In-memory credential store behind an async `RwLock`.
///
/// Cloning yields another handle onto the same session state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    inner: Arc<RwLock<Credentials>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a store that already holds a session.
    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Credentials {
                access: Some(pair.access_token),
                refresh: Some(pair.refresh_token),
            })),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn access_token(&self) -> Result<Option<AccessToken>, StoreError> {
        Ok(self.inner.read().await.access.clone())
    }

    async fn set_access_token(&self, token: AccessToken) -> Result<(), StoreError> {
        self.inner.write().await.access = Some(token);
        Ok(())
    }

    async fn refresh_token(&self) -> Result<Option<RefreshToken>, StoreError> {
        Ok(self.inner.read().await.refresh.clone())
    }

    async fn set_refresh_token(&self, token: RefreshToken) -> Result<(), StoreError> {
        self.inner.write().await.refresh = Some(token);
        Ok(())
    }

    async fn set_pair(&self, pair: CredentialPair) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.access = Some(pair.access_token);
        guard.refresh = Some(pair.refresh_token);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.access = None;
        guard.refresh = None;
        Ok(())
    }
}
