//! Authorization helpers over the session cookie.

use axum::http::{HeaderMap, StatusCode};

use super::state::AuthState;
use crate::session::{Role, SessionPayload};

/// Resolve the session cookie, or 401 when there is none.
pub fn require_auth(
    auth_state: &AuthState,
    headers: &HeaderMap,
) -> Result<SessionPayload, StatusCode> {
    auth_state
        .sessions()
        .current_identity(headers)
        .ok_or(StatusCode::UNAUTHORIZED)
}

/// Like [`require_auth`], but 403 unless the session carries `role`.
pub fn require_role(
    auth_state: &AuthState,
    headers: &HeaderMap,
    role: Role,
) -> Result<SessionPayload, StatusCode> {
    let payload = require_auth(auth_state, headers)?;
    if payload.role == role {
        Ok(payload)
    } else {
        Err(StatusCode::FORBIDDEN)
    }
}
