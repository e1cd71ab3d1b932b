//! The authenticated request gateway.

use std::sync::Arc;

use reqwest::StatusCode;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use vitrine_session::{AccessToken, CredentialStore, SessionTeardown};

use crate::error::GatewayError;
use crate::refresh::TokenRefresher;
use crate::request::{ApiRequest, Attempt};
use crate::transport::{ApiResponse, HttpTransport};

/// Attaches bearer credentials to outgoing requests and performs a single
/// transparent refresh-and-retry when a request comes back 401.
///
/// All collaborators sit behind trait objects: the transport, the refresh
/// endpoint client, the credential store, and the teardown hook are all
/// injected, so platform builds swap their own implementations in.
pub struct Gateway {
    transport: Arc<dyn HttpTransport>,
    refresher: Arc<dyn TokenRefresher>,
    store: Arc<dyn CredentialStore>,
    teardown: Arc<dyn SessionTeardown>,
    /// Single-flight gate: concurrent 401s coalesce onto one refresh call.
    refresh_gate: Mutex<()>,
}

impl Gateway {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        refresher: Arc<dyn TokenRefresher>,
        store: Arc<dyn CredentialStore>,
        teardown: Arc<dyn SessionTeardown>,
    ) -> Self {
        Self {
            transport,
            refresher,
            store,
            teardown,
            refresh_gate: Mutex::new(()),
        }
    }

    /// Execute one logical request.
    ///
    /// Returns `Ok` for any response the server actually produced, 401s
    /// excepted: the first 401 triggers a refresh-and-retry, and only an
    /// unrecoverable 401 surfaces as [`GatewayError::AuthInvalid`]. A
    /// missing access token is not an error; the request simply goes out
    /// unauthenticated and the server decides.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, GatewayError> {
        let mut attempt = Attempt::first(request);
        let mut bearer = self.store.access_token().await?;

        loop {
            let response = self.transport.send(attempt.request, bearer.as_ref()).await?;

            if response.status != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            if attempt.is_retry() {
                warn!(path = %request.path, "401 after refreshed retry, session is invalid");
                self.teardown.teardown().await;
                return Err(GatewayError::AuthInvalid { response });
            }

            debug!(path = %request.path, "401 received, attempting token refresh");
            bearer = Some(self.refresh_access_token(response, bearer).await?);
            attempt = attempt.retry();
        }
    }

    /// Obtain a usable access token after a 401, refreshing at most once
    /// across all concurrent callers.
    ///
    /// `stale` is the token the failed attempt was sent with. If the stored
    /// token already differs once the gate is acquired, another request
    /// refreshed while this one waited and its result is reused.
    async fn refresh_access_token(
        &self,
        original: ApiResponse,
        stale: Option<AccessToken>,
    ) -> Result<AccessToken, GatewayError> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.store.access_token().await? {
            if stale.as_ref() != Some(&current) {
                debug!("reusing token refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.store.refresh_token().await? else {
            warn!("401 with no refresh token in store, tearing session down");
            self.teardown.teardown().await;
            return Err(GatewayError::AuthInvalid { response: original });
        };

        match self.refresher.refresh(&refresh_token).await {
            Ok(credentials) => {
                self.store
                    .set_access_token(credentials.access_token.clone())
                    .await?;
                if let Some(rotated) = credentials.refresh_token {
                    self.store.set_refresh_token(rotated).await?;
                }
                debug!("token refresh succeeded");
                Ok(credentials.access_token)
            }
            Err(source) => {
                warn!(error = %source, "token refresh failed, tearing session down");
                self.teardown.teardown().await;
                Err(GatewayError::RefreshFailed { source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use vitrine_session::{CredentialPair, InMemoryCredentialStore, RefreshToken};

    use crate::refresh::{RefreshError, RefreshedCredentials};
    use crate::transport::TransportError;

    /// Transport that replays a scripted sequence of outcomes and records
    /// the bearer each attempt was sent with.
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
        bearers: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<ApiResponse, TransportError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                bearers: Mutex::new(Vec::new()),
            }
        }

        async fn recorded_bearers(&self) -> Vec<Option<String>> {
            self.bearers.lock().await.clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(
            &self,
            _request: &ApiRequest,
            bearer: Option<&AccessToken>,
        ) -> Result<ApiResponse, TransportError> {
            self.bearers
                .lock()
                .await
                .push(bearer.map(|t| t.as_str().to_string()));
            self.script
                .lock()
                .await
                .pop_front()
                .expect("transport called more often than scripted")
        }
    }

    /// Transport that accepts exactly one token and 401s everything else.
    struct ByTokenTransport {
        accepted: String,
        sends: AtomicUsize,
    }

    impl ByTokenTransport {
        fn new(accepted: &str) -> Self {
            Self {
                accepted: accepted.to_string(),
                sends: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HttpTransport for ByTokenTransport {
        async fn send(
            &self,
            _request: &ApiRequest,
            bearer: Option<&AccessToken>,
        ) -> Result<ApiResponse, TransportError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            if bearer.map(AccessToken::as_str) == Some(self.accepted.as_str()) {
                Ok(ApiResponse::new(StatusCode::OK, "{}"))
            } else {
                Ok(ApiResponse::new(StatusCode::UNAUTHORIZED, ""))
            }
        }
    }

    struct FakeRefresher {
        outcome: Result<RefreshedCredentials, RefreshError>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeRefresher {
        fn succeeding(access: &str, rotated_refresh: Option<&str>) -> Self {
            Self {
                outcome: Ok(RefreshedCredentials {
                    access_token: AccessToken::new(access),
                    refresh_token: rotated_refresh.map(RefreshToken::new),
                }),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(error: RefreshError) -> Self {
            Self {
                outcome: Err(error),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenRefresher for FakeRefresher {
        async fn refresh(
            &self,
            _refresh_token: &RefreshToken,
        ) -> Result<RefreshedCredentials, RefreshError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay > Duration::ZERO {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome.clone()
        }
    }

    /// Teardown that clears the store and counts invocations.
    struct CountingTeardown {
        store: Arc<InMemoryCredentialStore>,
        calls: AtomicUsize,
    }

    impl CountingTeardown {
        fn new(store: Arc<InMemoryCredentialStore>) -> Self {
            Self {
                store,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionTeardown for CountingTeardown {
        async fn teardown(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self.store.clear().await;
        }
    }

    fn logged_in_store() -> Arc<InMemoryCredentialStore> {
        Arc::new(InMemoryCredentialStore::with_pair(CredentialPair {
            access_token: AccessToken::new("stale"),
            refresh_token: RefreshToken::new("r1"),
        }))
    }

    fn gateway(
        transport: Arc<dyn HttpTransport>,
        refresher: Arc<dyn TokenRefresher>,
        store: Arc<InMemoryCredentialStore>,
        teardown: Arc<CountingTeardown>,
    ) -> Gateway {
        Gateway::new(transport, refresher, store, teardown)
    }

    fn ok(body: &str) -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse::new(StatusCode::OK, body))
    }

    fn status(status: StatusCode) -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse::new(status, ""))
    }

    #[tokio::test]
    async fn success_passes_through_without_refresh() {
        let store = logged_in_store();
        let transport = Arc::new(ScriptedTransport::new(vec![ok(r#"{"items":[]}"#)]));
        let refresher = Arc::new(FakeRefresher::succeeding("fresh", None));
        let teardown = Arc::new(CountingTeardown::new(store.clone()));
        let gw = gateway(transport.clone(), refresher.clone(), store, teardown);

        let response = gw.execute(&ApiRequest::get("/catalog/products")).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(refresher.call_count(), 0);
        assert_eq!(
            transport.recorded_bearers().await,
            vec![Some("stale".to_string())]
        );
    }

    #[tokio::test]
    async fn business_errors_are_returned_as_responses() {
        let store = logged_in_store();
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(StatusCode::INTERNAL_SERVER_ERROR),
        ]));
        let refresher = Arc::new(FakeRefresher::succeeding("fresh", None));
        let teardown = Arc::new(CountingTeardown::new(store.clone()));
        let gw = gateway(transport, refresher.clone(), store, teardown.clone());

        let response = gw.execute(&ApiRequest::get("/orders")).await.unwrap();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(refresher.call_count(), 0);
        assert_eq!(teardown.call_count(), 0);
    }

    #[tokio::test]
    async fn forbidden_is_not_retried() {
        let store = logged_in_store();
        let transport = Arc::new(ScriptedTransport::new(vec![status(StatusCode::FORBIDDEN)]));
        let refresher = Arc::new(FakeRefresher::succeeding("fresh", None));
        let teardown = Arc::new(CountingTeardown::new(store.clone()));
        let gw = gateway(transport, refresher.clone(), store, teardown);

        let response = gw.execute(&ApiRequest::get("/admin")).await.unwrap();
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(refresher.call_count(), 0);
    }

    #[tokio::test]
    async fn network_failure_propagates_without_refresh() {
        let store = logged_in_store();
        let transport = Arc::new(ScriptedTransport::new(vec![Err(TransportError::network(
            "connection timed out",
        ))]));
        let refresher = Arc::new(FakeRefresher::succeeding("fresh", None));
        let teardown = Arc::new(CountingTeardown::new(store.clone()));
        let gw = gateway(transport, refresher.clone(), store, teardown.clone());

        let err = gw.execute(&ApiRequest::get("/profile")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(TransportError::Network(_))));
        assert_eq!(refresher.call_count(), 0);
        assert_eq!(teardown.call_count(), 0);
    }

    #[tokio::test]
    async fn first_401_refreshes_and_retries_exactly_once() {
        let store = logged_in_store();
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(StatusCode::UNAUTHORIZED),
            ok(r#"{"id":1}"#),
        ]));
        let refresher = Arc::new(FakeRefresher::succeeding("fresh", Some("r2")));
        let teardown = Arc::new(CountingTeardown::new(store.clone()));
        let gw = gateway(
            transport.clone(),
            refresher.clone(),
            store.clone(),
            teardown.clone(),
        );

        let response = gw.execute(&ApiRequest::get("/profile")).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(refresher.call_count(), 1);
        assert_eq!(teardown.call_count(), 0);
        // The retry reused the request but carried the refreshed token.
        assert_eq!(
            transport.recorded_bearers().await,
            vec![Some("stale".to_string()), Some("fresh".to_string())]
        );
        // Rotated credentials were persisted for subsequent requests.
        assert_eq!(
            store.access_token().await.unwrap(),
            Some(AccessToken::new("fresh"))
        );
        assert_eq!(
            store.refresh_token().await.unwrap(),
            Some(RefreshToken::new("r2"))
        );
    }

    #[tokio::test]
    async fn refresh_failure_tears_down_once_and_propagates() {
        let store = logged_in_store();
        let transport = Arc::new(ScriptedTransport::new(vec![status(
            StatusCode::UNAUTHORIZED,
        )]));
        let refresher = Arc::new(FakeRefresher::failing(RefreshError::Rejected {
            status: 401,
        }));
        let teardown = Arc::new(CountingTeardown::new(store.clone()));
        let gw = gateway(transport, refresher.clone(), store.clone(), teardown.clone());

        let err = gw.execute(&ApiRequest::get("/profile")).await.unwrap_err();
        assert!(matches!(err, GatewayError::RefreshFailed { .. }));
        assert_eq!(teardown.call_count(), 1);
        assert_eq!(store.access_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_refresh_token_propagates_the_original_401() {
        let store = Arc::new(InMemoryCredentialStore::new());
        store
            .set_access_token(AccessToken::new("stale"))
            .await
            .unwrap();
        let transport = Arc::new(ScriptedTransport::new(vec![status(
            StatusCode::UNAUTHORIZED,
        )]));
        let refresher = Arc::new(FakeRefresher::succeeding("fresh", None));
        let teardown = Arc::new(CountingTeardown::new(store.clone()));
        let gw = gateway(transport, refresher.clone(), store, teardown.clone());

        let err = gw.execute(&ApiRequest::get("/profile")).await.unwrap_err();
        match err {
            GatewayError::AuthInvalid { response } => {
                assert_eq!(response.status, StatusCode::UNAUTHORIZED);
            }
            other => panic!("expected AuthInvalid, got {other:?}"),
        }
        assert_eq!(refresher.call_count(), 0);
        assert_eq!(teardown.call_count(), 1);
    }

    #[tokio::test]
    async fn second_401_propagates_without_a_second_refresh() {
        let store = logged_in_store();
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(StatusCode::UNAUTHORIZED),
            status(StatusCode::UNAUTHORIZED),
        ]));
        let refresher = Arc::new(FakeRefresher::succeeding("fresh", None));
        let teardown = Arc::new(CountingTeardown::new(store.clone()));
        let gw = gateway(transport.clone(), refresher.clone(), store, teardown.clone());

        let err = gw.execute(&ApiRequest::get("/profile")).await.unwrap_err();
        assert!(matches!(err, GatewayError::AuthInvalid { .. }));
        assert_eq!(refresher.call_count(), 1);
        assert_eq!(teardown.call_count(), 1);
        assert_eq!(transport.recorded_bearers().await.len(), 2);
    }

    #[tokio::test]
    async fn missing_access_token_sends_unauthenticated() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let transport = Arc::new(ScriptedTransport::new(vec![ok("{}")]));
        let refresher = Arc::new(FakeRefresher::succeeding("fresh", None));
        let teardown = Arc::new(CountingTeardown::new(store.clone()));
        let gw = gateway(transport.clone(), refresher, store, teardown);

        let response = gw.execute(&ApiRequest::get("/catalog/products")).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(transport.recorded_bearers().await, vec![None]);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_401s_coalesce_onto_one_refresh() {
        let store = logged_in_store();
        let transport = Arc::new(ByTokenTransport::new("fresh"));
        let refresher = Arc::new(
            FakeRefresher::succeeding("fresh", None).with_delay(Duration::from_millis(50)),
        );
        let teardown = Arc::new(CountingTeardown::new(store.clone()));
        let gw = gateway(transport.clone(), refresher.clone(), store, teardown);

        let first = ApiRequest::get("/cart");
        let second = ApiRequest::get("/reservations");
        let (a, b) = tokio::join!(gw.execute(&first), gw.execute(&second));

        assert_eq!(a.unwrap().status, StatusCode::OK);
        assert_eq!(b.unwrap().status, StatusCode::OK);
        // Both requests 401'd on the stale token, but only one refresh call
        // went out; the second request reused its result.
        assert_eq!(refresher.call_count(), 1);
        assert_eq!(transport.sends.load(Ordering::SeqCst), 4);
    }
}
