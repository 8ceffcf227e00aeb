//! Auth state and configuration shared by the handlers.

use secrecy::SecretString;
use std::{sync::Arc, time::Duration};

use super::users::UserStore;
use crate::{rate_limit::RateLimiter, session::SessionCookies};

const DEFAULT_LOGIN_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_LOGIN_WINDOW_SECONDS: u64 = 15 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    login_max_attempts: u32,
    login_window_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            login_max_attempts: DEFAULT_LOGIN_MAX_ATTEMPTS,
            login_window_seconds: DEFAULT_LOGIN_WINDOW_SECONDS,
        }
    }

    #[must_use]
    pub fn with_login_max_attempts(mut self, attempts: u32) -> Self {
        self.login_max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_login_window_seconds(mut self, seconds: u64) -> Self {
        self.login_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn login_max_attempts(&self) -> u32 {
        self.login_max_attempts
    }

    #[must_use]
    pub fn login_window(&self) -> Duration {
        Duration::from_secs(self.login_window_seconds)
    }
}

pub struct AuthState {
    config: AuthConfig,
    sessions: SessionCookies,
    rate_limiter: Arc<dyn RateLimiter>,
    users: Arc<dyn UserStore>,
    admin_password: Option<SecretString>,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        sessions: SessionCookies,
        rate_limiter: Arc<dyn RateLimiter>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            config,
            sessions,
            rate_limiter,
            users,
            admin_password: None,
        }
    }

    /// Enable the legacy shared admin password login.
    #[must_use]
    pub fn with_admin_password(mut self, password: Option<SecretString>) -> Self {
        self.admin_password = password;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionCookies {
        &self.sessions
    }

    #[must_use]
    pub fn rate_limiter(&self) -> Arc<dyn RateLimiter> {
        self.rate_limiter.clone()
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    pub(super) fn admin_password(&self) -> Option<&SecretString> {
        self.admin_password.as_ref()
    }
}
