//! Local password login.
//!
//! Flow: throttle by caller address, validate the body, look the user up,
//! verify the Argon2 hash off the async runtime, then issue the session
//! cookie. Unknown users and wrong passwords get the same 401.

use axum::{
    extract::Extension,
    http::{header::RETRY_AFTER, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, warn};

use super::{
    password::{hash_password, verify_password},
    session::issue_session,
    state::AuthState,
    types::{LoginRequest, SessionResponse},
    utils::{login_identifier, valid_email},
};
use crate::{clock, rate_limit::client_key, session::Identity};

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 400, description = "Missing or invalid payload"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Email address not verified"),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    if let Err(response) = throttle(&auth_state, "login", &headers) {
        return response;
    }

    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload").into_response();
    };

    let Some(email) = login_identifier(&request.email).filter(|email| valid_email(email)) else {
        return (StatusCode::BAD_REQUEST, "Invalid email or password").into_response();
    };
    if request.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Invalid email or password").into_response();
    }

    let user = match auth_state.users().find_by_identifier(&email).await {
        Ok(user) => user,
        Err(err) => {
            error!("Failed to look up user: {err:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // Unknown users are checked against a dummy hash so they cost the same
    // Argon2 work as a wrong password.
    let password = request.password;
    let stored_hash = user.as_ref().map(|user| user.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash),
        None => verify_password(&password, dummy_password_hash()).map(|_| false),
    })
    .await;

    let Some(user) = user else {
        debug!("Login attempt for unknown identifier");
        return invalid_credentials();
    };

    match verified {
        Ok(Ok(true)) => {}
        Ok(Ok(false)) => {
            debug!(user_id = %user.id, "Login attempt with wrong password");
            return invalid_credentials();
        }
        Ok(Err(err)) => {
            warn!(user_id = %user.id, "Stored password hash is unusable: {err}");
            return invalid_credentials();
        }
        Err(err) => {
            error!("Password verification task failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    if !user.email_verified {
        return (StatusCode::FORBIDDEN, "Email address not verified").into_response();
    }

    issue_session(&auth_state, &Identity::new(user.id, user.role))
}

/// Count an attempt against `<scope>:<client>` and build the 429 response
/// when the caller is over budget.
pub(super) fn throttle(
    auth_state: &AuthState,
    scope: &str,
    headers: &HeaderMap,
) -> Result<(), Response> {
    let key = format!("{scope}:{}", client_key(headers));
    let decision = auth_state.rate_limiter().check(
        &key,
        auth_state.config().login_max_attempts(),
        auth_state.config().login_window(),
    );
    if decision.allowed {
        return Ok(());
    }

    warn!(key = %key, "Rate limit exceeded");
    let retry_after = decision.retry_after_seconds(clock::unix_millis());
    let mut response_headers = HeaderMap::new();
    response_headers.insert(RETRY_AFTER, HeaderValue::from(retry_after));
    Err((
        StatusCode::TOO_MANY_REQUESTS,
        response_headers,
        "Too many attempts, try again later",
    )
        .into_response())
}

/// Argon2id hash of a throwaway password, built once with the same
/// parameters as real account hashes.
fn dummy_password_hash() -> &'static str {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    DUMMY_HASH.get_or_init(|| hash_password("ttw-unknown-account").unwrap_or_default())
}

fn invalid_credentials() -> Response {
    (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response()
}
