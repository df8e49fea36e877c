//! Conversion funnel aggregation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    CampaignRepository, ConversionLogRepository, ConversionStatsQuery, OrgRepository,
};
use crate::domain::{
    CampaignId, ConversionReport, ConversionStats, Error, OrgId, PublicConversionReport,
    TenantGuard, UserId,
};

/// Service implementing [`ConversionStatsQuery`].
pub struct ConversionStatsService<C, K, O> {
    logs: Arc<C>,
    campaigns: Arc<K>,
    tenants: TenantGuard<O>,
}

impl<C, K, O> ConversionStatsService<C, K, O> {
    /// Create a service reading logs and campaign counts.
    pub fn new(logs: Arc<C>, campaigns: Arc<K>, orgs: Arc<O>) -> Self {
        Self {
            logs,
            campaigns,
            tenants: TenantGuard::new(orgs),
        }
    }
}

impl<C, K, O> ConversionStatsService<C, K, O>
where
    C: ConversionLogRepository,
    K: CampaignRepository,
{
    async fn report(&self, org_id: &OrgId) -> Result<ConversionReport, Error> {
        let tally = self.logs.tally(org_id, None).await?;
        let campaign_count = self.campaigns.count(org_id).await?;
        debug!(
            org_id = %org_id,
            opens = tally.opens,
            clicks = tally.clicks,
            campaign_count,
            "built conversion report"
        );
        Ok(ConversionReport::new(tally, campaign_count))
    }
}

#[async_trait]
impl<C, K, O> ConversionStatsQuery for ConversionStatsService<C, K, O>
where
    C: ConversionLogRepository,
    K: CampaignRepository,
    O: OrgRepository,
{
    async fn conversion_stats(
        &self,
        caller: &UserId,
        org_id: &OrgId,
        campaign_id: Option<CampaignId>,
    ) -> Result<ConversionStats, Error> {
        self.tenants.authorize(caller, org_id).await?;
        let tally = self.logs.tally(org_id, campaign_id).await?;
        Ok(tally.into())
    }

    async fn conversion_report(
        &self,
        caller: &UserId,
        org_id: &OrgId,
    ) -> Result<ConversionReport, Error> {
        self.tenants.authorize(caller, org_id).await?;
        self.report(org_id).await
    }

    async fn public_conversion_report(
        &self,
        org_id: &OrgId,
    ) -> Result<PublicConversionReport, Error> {
        Ok(self.report(org_id).await?.into())
    }
}
