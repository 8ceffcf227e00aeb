//! # TTW (session and login throttling)
//!
//! `ttw` authenticates visitors and admin dashboard operators of the TTW
//! educational-travel site.
//!
//! ## Sessions
//!
//! A session is a stateless cookie (`ttw_session`) holding a base64url JSON
//! payload `{v, sub, role, exp}` and an HMAC-SHA256 signature over it. Any
//! problem with a presented cookie (malformed, tampered, expired) is treated
//! exactly like having no cookie at all, so the API never tells a caller which
//! check failed.
//!
//! ## Login throttling
//!
//! Login attempts are counted per caller address in fixed windows. The
//! counters live in process memory and reset on restart.
//!
//! ## Configuration
//!
//! Production deployments must provide `TTW_SESSION_SECRET`; without it the
//! server refuses to start. Development falls back to a fixed, insecure key.

pub mod api;
pub mod cli;
pub mod clock;
pub mod environment;
pub mod rate_limit;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
