//! Admin dashboard login and session probe.
//!
//! The shared admin password is a legacy override kept for deployments that
//! have not moved their operators to user accounts. It is only enabled when
//! configured and is compared in constant time.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::warn;

use super::{
    login::throttle,
    principal::require_role,
    session::issue_session,
    state::AuthState,
    types::{AdminLoginRequest, SessionResponse},
    utils::secrets_match,
};
use crate::session::{Identity, Role};

/// Subject recorded for sessions opened with the shared admin password.
pub const ADMIN_SUBJECT: &str = "admin";

#[utoipa::path(
    post,
    path = "/v1/auth/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Admin session issued", body = SessionResponse),
        (status = 400, description = "Missing payload"),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "Admin password login is disabled"),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "admin"
)]
pub async fn admin_login(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<AdminLoginRequest>>,
) -> Response {
    let Some(expected) = auth_state.admin_password() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if let Err(response) = throttle(&auth_state, "admin-login", &headers) {
        return response;
    }

    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload").into_response();
    };

    if !secrets_match(expected.expose_secret(), &request.password) {
        warn!("Rejected admin password login");
        return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
    }

    issue_session(&auth_state, &Identity::new(ADMIN_SUBJECT, Role::Admin))
}

#[utoipa::path(
    get,
    path = "/v1/auth/admin/session",
    responses(
        (status = 200, description = "Admin session is active", body = SessionResponse),
        (status = 401, description = "No active session"),
        (status = 403, description = "Session is not an admin session")
    ),
    tag = "admin"
)]
pub async fn admin_session(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> Response {
    match require_role(&auth_state, &headers, Role::Admin) {
        Ok(payload) => (StatusCode::OK, Json(SessionResponse::from(&payload))).into_response(),
        Err(status) => status.into_response(),
    }
}
