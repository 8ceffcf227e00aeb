//! Request and response bodies for the auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::session::{Role, SessionPayload};

#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub subject: String,
    pub role: Role,
    /// Epoch seconds.
    pub expires_at: i64,
}

impl From<&SessionPayload> for SessionResponse {
    fn from(payload: &SessionPayload) -> Self {
        Self {
            subject: payload.subject.clone(),
            role: payload.role,
            expires_at: payload.expiry,
        }
    }
}
