use axum::http::header::InvalidHeaderValue;
use thiserror::Error;

/// Configuration and construction failures of the session layer.
///
/// Attacker-controlled input never produces one of these; malformed,
/// tampered or expired tokens are reported as a [`Rejection`] internally and
/// as `None` to callers.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session signing secret is required in production")]
    MissingSecret,
    #[error("the development fallback secret cannot sign production sessions")]
    InsecureSecret,
    #[error("invalid session signing key")]
    InvalidKey,
    #[error("cannot issue a session without a subject")]
    EmptySubject,
    #[error("invalid session cookie name: {0:?}")]
    InvalidCookieName(String),
    #[error("failed to serialize session payload")]
    Json(#[from] serde_json::Error),
    #[error("invalid cookie header value")]
    Header(#[from] InvalidHeaderValue),
}

/// Why a presented session was not accepted.
///
/// Only ever logged; never returned across the public API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Rejection {
    MissingCookie,
    MalformedToken,
    BadSignature,
    MalformedPayload,
    Expired,
}

impl Rejection {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::MissingCookie => "missing_cookie",
            Self::MalformedToken => "malformed_token",
            Self::BadSignature => "bad_signature",
            Self::MalformedPayload => "malformed_payload",
            Self::Expired => "expired",
        }
    }
}
