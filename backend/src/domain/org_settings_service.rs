//! Per-org newsletter configuration.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{OrgConfigRepository, OrgRepository, OrgSettings};
use crate::domain::{Error, OrgConfig, OrgId, TenantGuard, UserId};

/// Service implementing [`OrgSettings`].
pub struct OrgSettingsService<G, O> {
    configs: Arc<G>,
    tenants: TenantGuard<O>,
    clock: Arc<dyn Clock>,
}

impl<G, O> OrgSettingsService<G, O> {
    pub fn new(configs: Arc<G>, orgs: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self {
            configs,
            tenants: TenantGuard::new(orgs),
            clock,
        }
    }
}

#[async_trait]
impl<G, O> OrgSettings for OrgSettingsService<G, O>
where
    G: OrgConfigRepository,
    O: OrgRepository,
{
    async fn org_config(&self, caller: &UserId, org_id: &OrgId) -> Result<OrgConfig, Error> {
        self.tenants.authorize(caller, org_id).await?;
        Ok(self.configs.find(org_id).await?.unwrap_or_default())
    }

    async fn set_org_config(
        &self,
        caller: &UserId,
        org_id: &OrgId,
        config: OrgConfig,
    ) -> Result<(), Error> {
        self.tenants.authorize(caller, org_id).await?;
        self.configs.save(org_id, &config, self.clock.utc()).await?;
        info!(org_id = %org_id, "saved org config");
        Ok(())
    }
}
