//! Builders wiring repositories into the driving ports held by `HttpState`.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use clinic_newsletter::domain::ports::{
    CampaignRepository, ConversionLogRepository, LoginService, OrgConfigRepository,
    OrgRepository, ResponseCache, SubscriberRepository, TrackingLinkRepository,
};
use clinic_newsletter::domain::{
    CampaignService, ConversionStatsService, ConversionTrackingService, OrgDataExportService,
    OrgProvisioningService, OrgSettingsService, SubscriberImportService,
};
use clinic_newsletter::inbound::http::state::{HttpState, HttpStatePorts};
use clinic_newsletter::outbound::cache::MemoryResponseCache;
use clinic_newsletter::outbound::memory::MemoryStore;
use clinic_newsletter::outbound::persistence::{
    DbPool, DieselCampaignRepository, DieselConversionLogRepository, DieselOrgConfigRepository,
    DieselOrgRepository, DieselSubscriberRepository, DieselTrackingLinkRepository,
};

use super::ServerConfig;
use super::config::ServiceSettings;

/// One adapter per driven port.
struct Repositories<O, S, L, C, K, G> {
    orgs: Arc<O>,
    subscribers: Arc<S>,
    links: Arc<L>,
    logs: Arc<C>,
    campaigns: Arc<K>,
    configs: Arc<G>,
}

fn diesel_repositories(
    pool: &DbPool,
) -> Repositories<
    DieselOrgRepository,
    DieselSubscriberRepository,
    DieselTrackingLinkRepository,
    DieselConversionLogRepository,
    DieselCampaignRepository,
    DieselOrgConfigRepository,
> {
    Repositories {
        orgs: Arc::new(DieselOrgRepository::new(pool.clone())),
        subscribers: Arc::new(DieselSubscriberRepository::new(pool.clone())),
        links: Arc::new(DieselTrackingLinkRepository::new(pool.clone())),
        logs: Arc::new(DieselConversionLogRepository::new(pool.clone())),
        campaigns: Arc::new(DieselCampaignRepository::new(pool.clone())),
        configs: Arc::new(DieselOrgConfigRepository::new(pool.clone())),
    }
}

fn memory_repositories(
    store: Arc<MemoryStore>,
) -> Repositories<MemoryStore, MemoryStore, MemoryStore, MemoryStore, MemoryStore, MemoryStore> {
    Repositories {
        orgs: store.clone(),
        subscribers: store.clone(),
        links: store.clone(),
        logs: store.clone(),
        campaigns: store.clone(),
        configs: store,
    }
}

/// Construct every domain service over the given repositories.
fn build_ports<O, S, L, C, K, G>(
    repos: Repositories<O, S, L, C, K, G>,
    login: Arc<dyn LoginService>,
    cache: Arc<dyn ResponseCache>,
    clock: Arc<dyn Clock>,
    settings: &ServiceSettings,
) -> HttpStatePorts
where
    O: OrgRepository + 'static,
    S: SubscriberRepository + 'static,
    L: TrackingLinkRepository + 'static,
    C: ConversionLogRepository + 'static,
    K: CampaignRepository + 'static,
    G: OrgConfigRepository + 'static,
{
    let Repositories {
        orgs,
        subscribers,
        links,
        logs,
        campaigns,
        configs,
    } = repos;

    HttpStatePorts {
        login,
        provisioning: Arc::new(OrgProvisioningService::new(orgs.clone())),
        imports: Arc::new(
            SubscriberImportService::new(subscribers.clone(), orgs.clone(), clock.clone())
                .with_hash_policy(settings.hash_policy),
        ),
        tracking: Arc::new(
            ConversionTrackingService::new(links, logs.clone(), orgs.clone(), clock.clone())
                .with_config(settings.idempotency),
        ),
        stats: Arc::new(ConversionStatsService::new(
            logs,
            campaigns.clone(),
            orgs.clone(),
        )),
        campaigns: Arc::new(CampaignService::new(
            campaigns.clone(),
            orgs.clone(),
            clock.clone(),
            settings.tracking_base_url.clone(),
        )),
        settings: Arc::new(OrgSettingsService::new(configs, orgs.clone(), clock)),
        exports: Arc::new(
            OrgDataExportService::new(subscribers, campaigns, orgs, cache)
                .with_config(settings.idempotency),
        ),
    }
}

/// Build handler state from the server configuration.
///
/// Diesel repositories back the ports when a pool is configured; otherwise a
/// single [`MemoryStore`] does. Exports replay from the configured shared
/// cache, or an in-process map when none is set.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let cache = config.response_cache.clone().unwrap_or_else(|| {
        info!("using in-process export replay cache");
        Arc::new(MemoryResponseCache::new(clock.clone()))
    });
    let login = config.login.clone();

    let ports = match &config.db_pool {
        Some(pool) => build_ports(
            diesel_repositories(pool),
            login,
            cache,
            clock,
            &config.services,
        ),
        None => {
            info!("no database configured; using in-memory repositories");
            build_ports(
                memory_repositories(Arc::new(MemoryStore::new())),
                login,
                cache,
                clock,
                &config.services,
            )
        }
    };
    web::Data::new(HttpState::with_config(ports, config.http.clone()))
}
