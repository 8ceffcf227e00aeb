use crate::{environment::Environment, session::DEFAULT_COOKIE_NAME};
use clap::{builder::ValueParser, Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_ENVIRONMENT: &str = "environment";
pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_COOKIE_NAME: &str = "session-cookie-name";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";
pub const ARG_LOGIN_MAX_ATTEMPTS: &str = "login-max-attempts";
pub const ARG_LOGIN_WINDOW_SECONDS: &str = "login-window-seconds";

#[derive(Debug)]
pub struct Options {
    pub environment: Environment,
    pub session_secret: Option<SecretString>,
    pub cookie_name: String,
    pub session_ttl_seconds: i64,
    pub admin_password: Option<SecretString>,
    pub login_max_attempts: u32,
    pub login_window_seconds: u64,
}

impl Options {
    /// Parse session and login arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is unexpectedly absent.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        // Empty env vars count as unset for secrets.
        let get_secret = |id: &str| {
            matches
                .get_one::<String>(id)
                .filter(|value| !value.trim().is_empty())
                .map(|value| SecretString::from(value.clone()))
        };

        let cookie_name = matches
            .get_one::<String>(ARG_SESSION_COOKIE_NAME)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());

        Ok(Self {
            environment: matches
                .get_one::<Environment>(ARG_ENVIRONMENT)
                .copied()
                .unwrap_or_default(),
            session_secret: get_secret(ARG_SESSION_SECRET),
            cookie_name,
            session_ttl_seconds: required(matches, ARG_SESSION_TTL_SECONDS)?,
            admin_password: get_secret(ARG_ADMIN_PASSWORD),
            login_max_attempts: required(matches, ARG_LOGIN_MAX_ATTEMPTS)?,
            login_window_seconds: required(matches, ARG_LOGIN_WINDOW_SECONDS)?,
        })
    }
}

fn required<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> anyhow::Result<T> {
    matches
        .get_one::<T>(id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
}

#[must_use]
pub fn validator_environment() -> ValueParser {
    ValueParser::from(|value: &str| value.parse::<Environment>())
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_session_args(command);
    with_login_args(command)
}

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long(ARG_ENVIRONMENT)
                .help("Deployment environment: production or development")
                .long_help(
                    "Deployment environment.\n\nIn production the session secret is mandatory and cookies carry the Secure attribute.",
                )
                .env("TTW_ENV")
                .default_value("development")
                .value_parser(validator_environment()),
        )
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("Secret used to sign session cookies")
                .long_help(
                    "Secret used to sign session cookies (HMAC-SHA256).\n\nRequired in production. In development an insecure built-in key is used when unset.",
                )
                .env("TTW_SESSION_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE_NAME)
                .long(ARG_SESSION_COOKIE_NAME)
                .help("Name of the session cookie")
                .env("TTW_SESSION_COOKIE_NAME")
                .default_value(DEFAULT_COOKIE_NAME),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("TTW_SESSION_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
}

fn with_login_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Shared admin password; admin login is disabled when unset")
                .env("TTW_ADMIN_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_LOGIN_MAX_ATTEMPTS)
                .long(ARG_LOGIN_MAX_ATTEMPTS)
                .help("Login attempts allowed per client within one window")
                .env("TTW_LOGIN_MAX_ATTEMPTS")
                .default_value("5")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_LOGIN_WINDOW_SECONDS)
                .long(ARG_LOGIN_WINDOW_SECONDS)
                .help("Length of the login rate limit window in seconds")
                .env("TTW_LOGIN_WINDOW_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
