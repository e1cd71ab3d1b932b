//! `vitrine-session` — client session credentials.
//!
//! The credential pair (short-lived access token, longer-lived refresh
//! token) lives behind an explicit store object handed to the gateway, not
//! behind module-level globals. A platform build plugs its secure storage in
//! at the [`CredentialStore`] seam; this crate ships the in-memory
//! implementation used by tests and by the gateway's own session handling.

pub mod credentials;
pub mod store;
pub mod teardown;

pub use credentials::{AccessToken, CredentialPair, RefreshToken};
pub use store::{CredentialStore, InMemoryCredentialStore, StoreError};
pub use teardown::{ClearingTeardown, SessionTeardown};
