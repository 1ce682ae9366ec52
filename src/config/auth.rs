//! Runtime credentials.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::error::RelayError;

/// Credential material for the hosted agent runtime.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Project API key, sent as `api-key`.
    ApiKey(String),
    /// Entra ID access token, sent as `Authorization: Bearer`.
    BearerToken(String),
}

impl Credential {
    /// Insert the auth header for this credential.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), RelayError> {
        let (name, value) = match self {
            Self::ApiKey(key) => (
                reqwest::header::HeaderName::from_static("api-key"),
                HeaderValue::from_str(key),
            ),
            Self::BearerToken(token) => (AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))),
        };
        let mut value = value.map_err(|_| {
            RelayError::Authentication("credential contains characters not allowed in a header".into())
        })?;
        value.set_sensitive(true);
        headers.insert(name, value);
        Ok(())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "api-key",
            Self::BearerToken(_) => "bearer-token",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential::{}(..)", self.kind())
    }
}
