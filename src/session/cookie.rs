//! Session cookie transport: issue, read and clear.

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use tracing::debug;

use super::{
    error::{Rejection, SessionError},
    payload::{Identity, SessionPayload},
    signer::TokenSigner,
};
use crate::{clock, environment::Environment};

pub const DEFAULT_COOKIE_NAME: &str = "ttw_session";
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Cookies left behind by earlier login schemes; cleared on logout.
pub const LEGACY_COOKIE_NAMES: [&str; 2] = ["admin_session", "ttw_admin"];

#[derive(Clone, Debug)]
pub struct SessionConfig {
    cookie_name: String,
    ttl_seconds: i64,
    secure: bool,
}

impl SessionConfig {
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            secure: environment.is_production(),
        }
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: String) -> Self {
        self.cookie_name = name;
        self
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    #[must_use]
    pub const fn secure(&self) -> bool {
        self.secure
    }
}

/// Bridges signed session tokens and the HTTP cookie headers.
#[derive(Clone, Debug)]
pub struct SessionCookies {
    config: SessionConfig,
    signer: TokenSigner,
}

impl SessionCookies {
    /// # Errors
    /// Returns an error if the configured cookie name is not a valid cookie token.
    pub fn new(config: SessionConfig, signer: TokenSigner) -> Result<Self, SessionError> {
        if !valid_cookie_name(config.cookie_name()) {
            return Err(SessionError::InvalidCookieName(config.cookie_name));
        }
        Ok(Self { config, signer })
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sign a fresh session for `identity` and append its `Set-Cookie` header.
    ///
    /// # Errors
    /// Returns an error if the identity has an empty subject, the payload cannot
    /// be serialized or the header cannot be built.
    pub fn issue(
        &self,
        identity: &Identity,
        response_headers: &mut HeaderMap,
    ) -> Result<SessionPayload, SessionError> {
        self.issue_at(identity, response_headers, clock::unix_seconds())
    }

    /// [`Self::issue`] with an explicit clock.
    ///
    /// # Errors
    /// Same as [`Self::issue`].
    pub fn issue_at(
        &self,
        identity: &Identity,
        response_headers: &mut HeaderMap,
        now: i64,
    ) -> Result<SessionPayload, SessionError> {
        if identity.subject.is_empty() {
            return Err(SessionError::EmptySubject);
        }

        let ttl = self.config.ttl_seconds();
        let payload = SessionPayload::new(identity, now.saturating_add(ttl));
        let token = self.signer.seal(&payload)?;

        let cookie = self.cookie_header(self.config.cookie_name(), &token, ttl)?;
        response_headers.append(SET_COOKIE, cookie);

        Ok(payload)
    }

    /// Identity carried by the request's session cookie, if any.
    ///
    /// Every failure (missing cookie, malformed token, bad signature, bad
    /// payload, expired) returns `None`.
    #[must_use]
    pub fn current_identity(&self, request_headers: &HeaderMap) -> Option<SessionPayload> {
        self.current_identity_at(request_headers, clock::unix_seconds())
    }

    /// [`Self::current_identity`] with an explicit clock.
    #[must_use]
    pub fn current_identity_at(
        &self,
        request_headers: &HeaderMap,
        now: i64,
    ) -> Option<SessionPayload> {
        match self.verify(request_headers, now) {
            Ok(payload) => Some(payload),
            Err(rejection) => {
                debug!(reason = rejection.as_str(), "Session not accepted");
                None
            }
        }
    }

    /// Append expiring `Set-Cookie` headers for the session cookie and every
    /// legacy cookie name.
    ///
    /// # Errors
    /// Returns an error if a header value cannot be built.
    pub fn clear(&self, response_headers: &mut HeaderMap) -> Result<(), SessionError> {
        for name in std::iter::once(self.config.cookie_name()).chain(LEGACY_COOKIE_NAMES) {
            let cookie = self.cookie_header(name, "", 0)?;
            response_headers.append(SET_COOKIE, cookie);
        }

        Ok(())
    }

    fn verify(&self, request_headers: &HeaderMap, now: i64) -> Result<SessionPayload, Rejection> {
        let token = read_cookie(request_headers, self.config.cookie_name())
            .ok_or(Rejection::MissingCookie)?;
        let payload = self.signer.unseal(&token)?;
        if payload.is_expired(now) {
            return Err(Rejection::Expired);
        }
        Ok(payload)
    }

    fn cookie_header(
        &self,
        name: &str,
        value: &str,
        max_age: i64,
    ) -> Result<HeaderValue, SessionError> {
        let mut cookie =
            format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
        if self.config.secure() {
            cookie.push_str("; Secure");
        }
        Ok(HeaderValue::from_str(&cookie)?)
    }
}

/// Value of the first cookie called `name` across all `Cookie` headers.
#[must_use]
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| val.trim().to_string())
        })
        .filter(|value| !value.is_empty())
}

fn valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}
