//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing credential store, so handler tests can substitute a test double.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}

/// One account known to [`ConfiguredLoginService`].
#[derive(Debug, Clone)]
pub struct ConfiguredAccount {
    pub username: String,
    pub password: zeroize::Zeroizing<String>,
    pub user_id: UserId,
}

/// Authenticator backed by accounts supplied through configuration.
///
/// Physician identity proper lives in an external identity provider; this
/// adapter covers local development and tests.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLoginService {
    accounts: Vec<ConfiguredAccount>,
}

impl ConfiguredLoginService {
    /// Create an authenticator without accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account.
    #[must_use]
    pub fn with_account(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        user_id: UserId,
    ) -> Self {
        self.accounts.push(ConfiguredAccount {
            username: username.into(),
            password: zeroize::Zeroizing::new(password.into()),
            user_id,
        });
        self
    }
}

#[async_trait]
impl LoginService for ConfiguredLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        self.accounts
            .iter()
            .find(|account| credentials.matches(&account.username, &account.password))
            .map(|account| account.user_id.clone())
            .ok_or_else(|| Error::unauthenticated("invalid credentials"))
    }
}
