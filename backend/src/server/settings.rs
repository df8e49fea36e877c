//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CLINIC_*` environment variables and an
//! optional config file. Missing values fall back to the defaults below.

use std::net::SocketAddr;

use clinic_newsletter::domain::{IdempotencyConfig, ImportHashPolicy, UserId};
use clinic_newsletter::inbound::http::state::{DEFAULT_FALLBACK_REDIRECT_URL, HttpConfig};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TRACKING_BASE_URL: &str = "https://t.hetu-system.web.app";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{field} must be an absolute http(s) URL, got '{value}'")]
    NotAnHttpUrl { field: &'static str, value: String },
    #[error("fixture login needs username, password and user id together")]
    IncompleteFixtureLogin,
    #[error("invalid fixture login user id: {0}")]
    FixtureUserId(#[from] clinic_newsletter::domain::UserIdValidationError),
}

/// Credentials for the configured fixture physician.
#[derive(Debug, Clone)]
pub struct FixtureLogin {
    pub username: String,
    pub password: zeroize::Zeroizing<String>,
    pub user_id: UserId,
}

/// Runtime configuration for the newsletter service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLINIC")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL. In-memory adapters are used when absent.
    pub database_url: Option<String>,
    /// Redis URL for the shared export replay cache.
    pub redis_url: Option<String>,
    /// Trailing window, in seconds, for conversion dedup.
    pub dedup_window_secs: Option<u64>,
    /// Lifetime, in seconds, of replayable export responses.
    pub export_cache_ttl_secs: Option<u64>,
    /// Destination for legacy redirects without a usable target.
    pub fallback_redirect_url: Option<String>,
    /// Serve the deprecated `/api/v1/track` redirect.
    #[ortho_config(default = true)]
    pub legacy_redirect_enabled: bool,
    /// Base URL that tracking links are minted under.
    pub tracking_base_url: Option<String>,
    /// Hash received CSV text instead of trusting the client hash.
    #[ortho_config(default = false)]
    pub recompute_import_hash: bool,
    pub fixture_login_username: Option<String>,
    pub fixture_login_password: Option<String>,
    pub fixture_login_user_id: Option<String>,
}

impl AppSettings {
    /// Parse the bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Dedup window and export TTL, clamped to their allowed ranges.
    pub fn idempotency(&self) -> IdempotencyConfig {
        IdempotencyConfig::from_secs(
            self.dedup_window_secs
                .unwrap_or(IdempotencyConfig::DEFAULT_DEDUP_WINDOW_SECS),
            self.export_cache_ttl_secs
                .unwrap_or(IdempotencyConfig::DEFAULT_EXPORT_TTL_SECS),
        )
    }

    pub fn http_config(&self) -> Result<HttpConfig, SettingsError> {
        let fallback = self
            .fallback_redirect_url
            .as_deref()
            .unwrap_or(DEFAULT_FALLBACK_REDIRECT_URL);
        Ok(HttpConfig {
            fallback_redirect_url: require_http_url("fallback_redirect_url", fallback)?,
            legacy_redirect_enabled: self.legacy_redirect_enabled,
        })
    }

    pub fn tracking_base_url(&self) -> Result<String, SettingsError> {
        let base = self
            .tracking_base_url
            .as_deref()
            .unwrap_or(DEFAULT_TRACKING_BASE_URL);
        require_http_url("tracking_base_url", base)
    }

    pub fn hash_policy(&self) -> ImportHashPolicy {
        if self.recompute_import_hash {
            ImportHashPolicy::Recompute
        } else {
            ImportHashPolicy::TrustClient
        }
    }

    /// The fixture account, when all three of its fields are set.
    pub fn fixture_login(&self) -> Result<Option<FixtureLogin>, SettingsError> {
        match (
            &self.fixture_login_username,
            &self.fixture_login_password,
            &self.fixture_login_user_id,
        ) {
            (None, None, None) => Ok(None),
            (Some(username), Some(password), Some(user_id)) => Ok(Some(FixtureLogin {
                username: username.clone(),
                password: zeroize::Zeroizing::new(password.clone()),
                user_id: UserId::new(user_id)?,
            })),
            _ => Err(SettingsError::IncompleteFixtureLogin),
        }
    }
}

fn require_http_url(field: &'static str, value: &str) -> Result<String, SettingsError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Ok(value.trim_end_matches('/').to_owned())
        }
        _ => Err(SettingsError::NotAnHttpUrl {
            field,
            value: value.to_owned(),
        }),
    }
}
