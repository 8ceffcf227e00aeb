//! Map validated CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::{bail, Context, Result};
use url::Url;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or the DSN is not a
/// Postgres URL.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;
    validate_dsn(&dsn)?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        environment: auth_opts.environment,
        session_secret: auth_opts.session_secret,
        cookie_name: auth_opts.cookie_name,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        admin_password: auth_opts.admin_password,
        login_max_attempts: auth_opts.login_max_attempts,
        login_window_seconds: auth_opts.login_window_seconds,
    }))
}

fn validate_dsn(dsn: &str) -> Result<()> {
    let url = Url::parse(dsn).context("invalid TTW_DSN")?;
    match url.scheme() {
        "postgres" | "postgresql" => Ok(()),
        scheme => bail!("unsupported database scheme: {scheme}"),
    }
}
