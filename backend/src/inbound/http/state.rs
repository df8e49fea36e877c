//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only ever talk to driving
//! ports, so they can be exercised with in-memory adapters or mocks.

use std::sync::Arc;

use crate::domain::ports::{
    ConversionStatsQuery, ConversionTracking, LoginService, NewsletterCampaigns,
    OrgDataExporter, OrgProvisioning, OrgSettings, SubscriberImport,
};

/// Default destination when the legacy redirect lacks a usable target.
pub const DEFAULT_FALLBACK_REDIRECT_URL: &str = "https://google.com";

/// Parameter object bundling the driving ports used by HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub provisioning: Arc<dyn OrgProvisioning>,
    pub imports: Arc<dyn SubscriberImport>,
    pub tracking: Arc<dyn ConversionTracking>,
    pub stats: Arc<dyn ConversionStatsQuery>,
    pub campaigns: Arc<dyn NewsletterCampaigns>,
    pub settings: Arc<dyn OrgSettings>,
    pub exports: Arc<dyn OrgDataExporter>,
}

/// Behaviour toggles for the public tracking endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub fallback_redirect_url: String,
    pub legacy_redirect_enabled: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            fallback_redirect_url: DEFAULT_FALLBACK_REDIRECT_URL.to_owned(),
            legacy_redirect_enabled: true,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub provisioning: Arc<dyn OrgProvisioning>,
    pub imports: Arc<dyn SubscriberImport>,
    pub tracking: Arc<dyn ConversionTracking>,
    pub stats: Arc<dyn ConversionStatsQuery>,
    pub campaigns: Arc<dyn NewsletterCampaigns>,
    pub settings: Arc<dyn OrgSettings>,
    pub exports: Arc<dyn OrgDataExporter>,
    pub config: HttpConfig,
}

impl HttpState {
    /// Construct state with default [`HttpConfig`].
    pub fn new(ports: HttpStatePorts) -> Self {
        Self::with_config(ports, HttpConfig::default())
    }

    pub fn with_config(ports: HttpStatePorts, config: HttpConfig) -> Self {
        let HttpStatePorts {
            login,
            provisioning,
            imports,
            tracking,
            stats,
            campaigns,
            settings,
            exports,
        } = ports;
        Self {
            login,
            provisioning,
            imports,
            tracking,
            stats,
            campaigns,
            settings,
            exports,
            config,
        }
    }
}
