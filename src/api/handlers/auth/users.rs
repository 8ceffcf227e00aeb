//! Read-only view of the site's user records.
//!
//! The `users` table belongs to the content-management application; this
//! module only reads the columns login needs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use std::collections::HashMap;
use tracing::{info_span, warn, Instrument};

use crate::session::Role;

/// The subset of a user row consumed by login.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub password_hash: String,
    pub role: Role,
    pub email_verified: bool,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("email_verified", &self.email_verified)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by login identifier (normalized email).
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRecord>>;

    /// Cheap reachability check for health reporting.
    async fn ping(&self) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRecord>> {
        let query = r"
            SELECT id::text AS id, password_hash, role, email_verified
            FROM users
            WHERE lower(email) = $1
            LIMIT 1
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT"
        );
        let row = sqlx::query(query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up user")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row.try_get("id")?;
        let role: String = row.try_get("role")?;
        let Some(role) = Role::parse(&role) else {
            warn!(user_id = %id, role = %role, "User has an unknown role, refusing login");
            return Ok(None);
        };

        // Accounts created through social login have no local password.
        let password_hash: Option<String> = row.try_get("password_hash")?;

        Ok(Some(UserRecord {
            id,
            password_hash: password_hash.unwrap_or_default(),
            role,
            email_verified: row.try_get("email_verified")?,
        }))
    }

    async fn ping(&self) -> Result<()> {
        let span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        let mut conn = self
            .pool
            .acquire()
            .instrument(span.clone())
            .await
            .context("failed to acquire database connection")?;
        conn.ping()
            .instrument(span)
            .await
            .context("failed to ping database")
    }
}

/// Fixed set of users held in memory; for development and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryUserStore {
    users: HashMap<String, UserRecord>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user(mut self, identifier: &str, record: UserRecord) -> Self {
        self.users.insert(identifier.to_string(), record);
        self
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.get(identifier).cloned())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
