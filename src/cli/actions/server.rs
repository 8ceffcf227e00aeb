use crate::{
    api,
    cli::telemetry,
    api::handlers::auth::{AuthConfig, AuthState, PgUserStore},
    environment::Environment,
    rate_limit::InMemoryRateLimiter,
    session::{SessionConfig, SessionCookies, SigningSecret, TokenSigner},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub environment: Environment,
    pub session_secret: Option<SecretString>,
    pub cookie_name: String,
    pub session_ttl_seconds: i64,
    pub admin_password: Option<SecretString>,
    pub login_max_attempts: u32,
    pub login_window_seconds: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the signing secret is unusable, the database is unreachable,
/// or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let result = run(args).await;

    telemetry::shutdown_tracer();

    result
}

async fn run(args: Args) -> Result<()> {
    // Signing secret problems are fatal before the database is touched.
    let secret = SigningSecret::resolve(args.session_secret, args.environment)?;
    let signer = TokenSigner::new(&secret, args.environment)?;

    let session_config = SessionConfig::new(args.environment)
        .with_cookie_name(args.cookie_name)
        .with_ttl_seconds(args.session_ttl_seconds);
    let sessions = SessionCookies::new(session_config, signer)?;

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&args.dsn)
        .await
        .context("Failed to connect to database")?;

    let auth_config = AuthConfig::default()
        .with_login_max_attempts(args.login_max_attempts)
        .with_login_window_seconds(args.login_window_seconds);

    if args.admin_password.is_some() {
        info!("Shared admin password login is enabled");
    }

    let auth_state = AuthState::new(
        auth_config,
        sessions,
        Arc::new(InMemoryRateLimiter::new()),
        Arc::new(PgUserStore::new(pool)),
    )
    .with_admin_password(args.admin_password);

    info!(environment = %args.environment, port = args.port, "Starting ttw");

    api::new(args.port, Arc::new(auth_state)).await
}
