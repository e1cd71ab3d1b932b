//! Gateway error taxonomy.
//!
//! The gateway recovers exactly one class of failure transparently (a first
//! 401, via refresh-and-retry). Everything here is what it could *not*
//! recover. Business-level error statuses are not errors at this layer:
//! they come back as ordinary [`ApiResponse`] values.

use thiserror::Error;

use vitrine_session::StoreError;

use crate::refresh::RefreshError;
use crate::transport::{ApiResponse, TransportError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The session is invalid: a 401 that could not be recovered, either
    /// because the one-shot retry was already spent or because no refresh
    /// token was available. Session teardown has been triggered; the
    /// offending response is carried for the caller.
    #[error("authentication invalid (status {})", response.status)]
    AuthInvalid { response: ApiResponse },

    /// The refresh exchange itself failed. Session teardown has been
    /// triggered.
    #[error("token refresh failed: {source}")]
    RefreshFailed {
        #[source]
        source: RefreshError,
    },

    /// No usable response was received. Never triggers a refresh.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The credential store backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
