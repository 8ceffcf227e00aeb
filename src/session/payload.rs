//! Session payload and its cookie-safe encoding.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::error::{Rejection, SessionError};

/// The only payload format version accepted by [`decode`].
pub const TOKEN_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse a stored role name. Anything but `user` or `admin` is `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a session is issued to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub role: Role,
}

impl Identity {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }
}

/// Claims carried inside a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    #[serde(rename = "v")]
    pub version: u32,
    #[serde(rename = "sub")]
    pub subject: String,
    pub role: Role,
    /// Epoch seconds; the token is invalid once `now >= expiry`.
    #[serde(rename = "exp")]
    pub expiry: i64,
}

impl SessionPayload {
    #[must_use]
    pub fn new(identity: &Identity, expiry: i64) -> Self {
        Self {
            version: TOKEN_VERSION,
            subject: identity.subject.clone(),
            role: identity.role,
            expiry,
        }
    }

    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.subject.clone(), self.role)
    }

    #[must_use]
    pub const fn is_expired(&self, now: i64) -> bool {
        now >= self.expiry
    }
}

/// Serialize the payload to compact JSON and encode it as unpadded base64url.
///
/// # Errors
/// Returns an error only if JSON serialization fails.
pub fn encode(payload: &SessionPayload) -> Result<String, SessionError> {
    let json = serde_json::to_vec(payload)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

/// Reverse [`encode`]. Any malformed input yields `None`.
#[must_use]
pub fn decode(encoded: &str) -> Option<SessionPayload> {
    parse(encoded).ok()
}

pub(crate) fn parse(encoded: &str) -> Result<SessionPayload, Rejection> {
    let bytes = Base64UrlUnpadded::decode_vec(encoded).map_err(|_| Rejection::MalformedPayload)?;
    let payload: SessionPayload =
        serde_json::from_slice(&bytes).map_err(|_| Rejection::MalformedPayload)?;

    if payload.version != TOKEN_VERSION || payload.subject.is_empty() {
        return Err(Rejection::MalformedPayload);
    }

    Ok(payload)
}
