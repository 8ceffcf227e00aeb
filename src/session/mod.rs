//! Stateless, HMAC-signed session cookies.
//!
//! A session token is `"<payload>.<signature>"` where the payload is the
//! unpadded base64url encoding of a compact JSON [`SessionPayload`] and the
//! signature is an HMAC-SHA256 over the encoded payload, also base64url.
//!
//! Dependency order is [`payload`] -> [`signer`] -> [`cookie`]. Reading a
//! session never fails loudly: malformed, tampered and expired tokens all look
//! like "no session" to the caller, and the actual reason is only logged at
//! `debug`. The one fatal case is configuration: production refuses to start
//! without a signing secret.

pub mod cookie;
mod error;
pub mod payload;
pub mod signer;

pub use cookie::{SessionConfig, SessionCookies, DEFAULT_COOKIE_NAME, DEFAULT_SESSION_TTL_SECONDS};
pub use error::SessionError;
pub use payload::{decode, encode, Identity, Role, SessionPayload, TOKEN_VERSION};
pub use signer::{split_token, SigningSecret, TokenSigner};
