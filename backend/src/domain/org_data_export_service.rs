//! Clinic data export with idempotency-key replay.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CampaignRepository, ExportOrgDataRequest, ExportOrgDataResponse, OrgDataExporter,
    OrgRepository, ResponseCache, ResponseCacheKey, SubscriberRepository,
};
use crate::domain::{Error, IdempotencyConfig, OrgDataExport, TenantGuard};

/// Service implementing [`OrgDataExporter`].
///
/// Replay is best effort: cache failures are logged and the export is built
/// afresh, since a duplicate export is harmless while a failed one is not.
pub struct OrgDataExportService<S, K, O> {
    subscribers: Arc<S>,
    campaigns: Arc<K>,
    tenants: TenantGuard<O>,
    cache: Arc<dyn ResponseCache>,
    ttl: Duration,
}

impl<S, K, O> OrgDataExportService<S, K, O> {
    /// Create a service replaying exports from `cache` for the default TTL.
    pub fn new(
        subscribers: Arc<S>,
        campaigns: Arc<K>,
        orgs: Arc<O>,
        cache: Arc<dyn ResponseCache>,
    ) -> Self {
        Self {
            subscribers,
            campaigns,
            tenants: TenantGuard::new(orgs),
            cache,
            ttl: IdempotencyConfig::default().export_ttl(),
        }
    }

    /// Take the replay TTL from `config`.
    #[must_use]
    pub fn with_config(mut self, config: IdempotencyConfig) -> Self {
        self.ttl = config.export_ttl();
        self
    }

    async fn replay(&self, key: &ResponseCacheKey) -> Option<OrgDataExport> {
        let cached = match self.cache.get(key).await {
            Ok(cached) => cached?,
            Err(err) => {
                warn!(cache_key = %key, error = %err, "export replay lookup failed");
                return None;
            }
        };
        match serde_json::from_value(cached) {
            Ok(export) => Some(export),
            Err(err) => {
                warn!(cache_key = %key, error = %err, "discarding unreadable cached export");
                None
            }
        }
    }

    async fn remember(&self, key: &ResponseCacheKey, export: &OrgDataExport) -> Result<(), Error> {
        let value = serde_json::to_value(export)
            .map_err(|err| Error::internal(format!("failed to serialize export: {err}")))?;
        if let Err(err) = self.cache.put(key, &value, self.ttl).await {
            warn!(cache_key = %key, error = %err, "failed to store export for replay");
        }
        Ok(())
    }
}

#[async_trait]
impl<S, K, O> OrgDataExporter for OrgDataExportService<S, K, O>
where
    S: SubscriberRepository,
    K: CampaignRepository,
    O: OrgRepository,
{
    async fn export_org_data(
        &self,
        request: ExportOrgDataRequest,
    ) -> Result<ExportOrgDataResponse, Error> {
        let ExportOrgDataRequest {
            caller,
            org_id,
            idempotency_key,
        } = request;
        self.tenants.authorize(&caller, &org_id).await?;

        let cache_key = idempotency_key
            .as_ref()
            .map(|key| ResponseCacheKey::for_export(&org_id, key));
        if let Some(key) = &cache_key {
            if let Some(export) = self.replay(key).await {
                debug!(org_id = %org_id, cache_key = %key, "replayed export");
                return Ok(ExportOrgDataResponse {
                    export,
                    replayed: true,
                });
            }
        }

        let subscribers = self.subscribers.list_subscribers(&org_id).await?;
        let campaigns = self.campaigns.list(&org_id).await?;
        let export = OrgDataExport::new(subscribers, campaigns);
        if let Some(key) = &cache_key {
            self.remember(key, &export).await?;
        }

        info!(
            org_id = %org_id,
            subscribers = export.data.subscribers.len(),
            campaigns = export.data.campaigns.len(),
            "exported org data"
        );
        Ok(ExportOrgDataResponse {
            export,
            replayed: false,
        })
    }
}
