//! `vitrine-gateway` — authenticated request gateway.
//!
//! Wraps every outbound API call with bearer authentication and a single
//! transparent refresh-and-retry on 401. Everything else — success, business
//! errors, network failures — passes through untouched; this layer never
//! interprets response bodies.
//!
//! The request lifecycle is strictly sequential per request:
//! attach token → send → (on first 401) refresh → send retry. Concurrent
//! requests that hit 401 at the same time coalesce onto one refresh call.

pub mod error;
pub mod gateway;
pub mod refresh;
pub mod request;
pub mod transport;

pub use error::GatewayError;
pub use gateway::Gateway;
pub use refresh::{HttpTokenRefresher, RefreshError, RefreshedCredentials, TokenRefresher};
pub use request::{ApiRequest, Attempt};
pub use transport::{ApiResponse, HttpTransport, ReqwestTransport, TransportError};
