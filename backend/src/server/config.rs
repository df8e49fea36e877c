//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use clinic_newsletter::domain::ports::{ConfiguredLoginService, LoginService, ResponseCache};
use clinic_newsletter::domain::{IdempotencyConfig, ImportHashPolicy};
use clinic_newsletter::inbound::http::state::HttpConfig;
use clinic_newsletter::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Tunables forwarded to the domain services.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub idempotency: IdempotencyConfig,
    pub hash_policy: ImportHashPolicy,
    pub tracking_base_url: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            idempotency: IdempotencyConfig::default(),
            hash_policy: ImportHashPolicy::default(),
            tracking_base_url: "https://t.hetu-system.web.app".to_owned(),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) response_cache: Option<Arc<dyn ResponseCache>>,
    pub(crate) login: Arc<dyn LoginService>,
    pub(crate) http: HttpConfig,
    pub(crate) services: ServiceSettings,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    ///
    /// Without further builders the server runs on in-memory adapters and
    /// rejects every login.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            response_cache: None,
            login: Arc::new(ConfiguredLoginService::new()),
            http: HttpConfig::default(),
            services: ServiceSettings::default(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Replay exports from a shared cache instead of the in-process map.
    #[must_use]
    pub fn with_response_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.response_cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_login(mut self, login: Arc<dyn LoginService>) -> Self {
        self.login = login;
        self
    }

    #[must_use]
    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    #[must_use]
    pub fn with_service_settings(mut self, services: ServiceSettings) -> Self {
        self.services = services;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
