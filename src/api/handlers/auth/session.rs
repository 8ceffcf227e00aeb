//! Session endpoints and the shared issue/clear plumbing.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use super::{state::AuthState, types::SessionResponse};
use crate::session::Identity;

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    // Invalid, expired and missing cookies all look the same from here.
    match auth_state.sessions().current_identity(&headers) {
        Some(payload) => (StatusCode::OK, Json(SessionResponse::from(&payload))).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> Response {
    let mut response_headers = HeaderMap::new();
    if let Err(err) = auth_state.sessions().clear(&mut response_headers) {
        error!("Failed to build logout cookies: {err}");
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

/// Issue a session cookie for `identity` and describe it in the response body.
pub(super) fn issue_session(auth_state: &AuthState, identity: &Identity) -> Response {
    let mut response_headers = HeaderMap::new();
    match auth_state.sessions().issue(identity, &mut response_headers) {
        Ok(payload) => {
            info!(subject = %payload.subject, role = %payload.role, "Session issued");
            (
                StatusCode::OK,
                response_headers,
                Json(SessionResponse::from(&payload)),
            )
                .into_response()
        }
        Err(err) => {
            error!("Failed to issue session: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
