//! Token newtypes.

use serde::{Deserialize, Serialize};

/// Short-lived bearer credential attached to outgoing requests.
///
/// `Debug` is redacted so tokens never land in logs verbatim.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

/// Longer-lived credential exchanged for a fresh access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(String);

macro_rules! impl_token_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(token: impl Into<String>) -> Self {
                Self(token.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Debug for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!($name, "(<redacted>)"))
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

impl_token_newtype!(AccessToken, "AccessToken");
impl_token_newtype!(RefreshToken, "RefreshToken");

/// The credential pair owned by one client session.
///
/// Created at login, rotated at refresh, destroyed at logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}
