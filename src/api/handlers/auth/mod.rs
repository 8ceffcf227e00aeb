//! Auth handlers and supporting modules.
//!
//! Sessions are stateless signed cookies (see [`crate::session`]); nothing
//! about a session is stored server side, so logout only clears cookies and
//! a token stays valid until it expires.
//!
//! ## Login throttling
//!
//! Both login endpoints count attempts per caller address in fixed windows
//! (`login:<ip>` and `admin-login:<ip>`, 5 attempts per 15 minutes by
//! default). Callers over budget get `429` with a `Retry-After` header.
//!
//! ## Roles
//!
//! Sessions carry `user` or `admin`. Admin dashboard endpoints check the role
//! with [`principal::require_role`].

pub(crate) mod admin;
pub(crate) mod login;
mod password;
pub(crate) mod principal;
pub(crate) mod session;
mod state;
pub(crate) mod types;
mod users;
mod utils;

pub use password::{hash_password, verify_password};
pub use state::{AuthConfig, AuthState};
pub use users::{MemoryUserStore, PgUserStore, UserRecord, UserStore};
