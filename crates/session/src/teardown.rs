//! Session teardown on unrecoverable authentication failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::warn;

use crate::store::CredentialStore;

/// Hook invoked when a session cannot be recovered (refresh token missing or
/// rejected). Implementations must be idempotent: invoking teardown on an
/// already-torn-down session is safe.
#[async_trait]
pub trait SessionTeardown: Send + Sync {
    async fn teardown(&self);
}

/// Standard teardown: clears the credential store and fires a notification
/// callback (e.g. "navigate to the login screen") at most once.
pub struct ClearingTeardown {
    store: Arc<dyn CredentialStore>,
    notified: AtomicBool,
    on_logout: Option<Box<dyn Fn() + Send + Sync>>,
}

impl ClearingTeardown {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            notified: AtomicBool::new(false),
            on_logout: None,
        }
    }

    /// Attach a callback fired on the first teardown only.
    pub fn with_on_logout(mut self, on_logout: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_logout = Some(Box::new(on_logout));
        self
    }
}

#[async_trait]
impl SessionTeardown for ClearingTeardown {
    async fn teardown(&self) {
        // Clearing is itself idempotent, so it runs on every invocation; a
        // failed clear must not suppress the user-facing logout signal.
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear credentials during teardown");
        }

        if !self.notified.swap(true, Ordering::SeqCst) {
            if let Some(on_logout) = &self.on_logout {
                on_logout();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use crate::credentials::{AccessToken, CredentialPair, RefreshToken};
    use crate::store::InMemoryCredentialStore;

    fn store_with_session() -> Arc<InMemoryCredentialStore> {
        Arc::new(InMemoryCredentialStore::with_pair(CredentialPair {
            access_token: AccessToken::new("a1"),
            refresh_token: RefreshToken::new("r1"),
        }))
    }

    #[tokio::test]
    async fn teardown_clears_credentials() {
        let store = store_with_session();
        let teardown = ClearingTeardown::new(store.clone());

        teardown.teardown().await;
        assert_eq!(store.access_token().await.unwrap(), None);
        assert_eq!(store.refresh_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn logout_callback_fires_exactly_once() {
        let store = store_with_session();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let teardown = ClearingTeardown::new(store).with_on_logout(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        teardown.teardown().await;
        teardown.teardown().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn teardown_on_empty_store_is_safe() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let teardown = ClearingTeardown::new(store);
        teardown.teardown().await;
        teardown.teardown().await;
    }
}
