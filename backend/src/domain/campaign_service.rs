//! Newsletter campaign authoring.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    CampaignRepository, CreateCampaignRequest, CreatedCampaign, NewsletterCampaigns,
    OrgRepository, UpdateCampaignRequest,
};
use crate::domain::{
    CampaignId, Error, NewsletterCampaign, OrgId, TenantGuard, TrackingId, TrackingLink, UserId,
    tracking_url,
};

/// Service implementing [`NewsletterCampaigns`].
///
/// Creating a campaign also creates its call-to-action tracking link under
/// the same identifier, so `/t/{campaign_id}` resolves to the CTA URL.
pub struct CampaignService<K, O> {
    campaigns: Arc<K>,
    tenants: TenantGuard<O>,
    clock: Arc<dyn Clock>,
    tracking_base_url: String,
}

impl<K, O> CampaignService<K, O> {
    /// Create a service emitting tracking URLs under `tracking_base_url`.
    pub fn new(
        campaigns: Arc<K>,
        orgs: Arc<O>,
        clock: Arc<dyn Clock>,
        tracking_base_url: impl Into<String>,
    ) -> Self {
        Self {
            campaigns,
            tenants: TenantGuard::new(orgs),
            clock,
            tracking_base_url: tracking_base_url.into(),
        }
    }
}

#[async_trait]
impl<K, O> NewsletterCampaigns for CampaignService<K, O>
where
    K: CampaignRepository,
    O: OrgRepository,
{
    async fn create_campaign(
        &self,
        request: CreateCampaignRequest,
    ) -> Result<CreatedCampaign, Error> {
        let CreateCampaignRequest {
            caller,
            org_id,
            draft,
        } = request;
        self.tenants.authorize(&caller, &org_id).await?;

        let now = self.clock.utc();
        let campaign_id = CampaignId::generate();
        let campaign = draft.into_campaign(campaign_id.clone(), org_id.clone(), now);
        let tracking_id = TrackingId::from(campaign_id.clone());
        let link = TrackingLink::new(
            tracking_id.clone(),
            org_id.clone(),
            campaign_id.clone(),
            campaign.cta_url.clone(),
            now,
        );
        self.campaigns.create_with_link(&campaign, &link).await?;

        info!(org_id = %org_id, campaign_id = %campaign_id, "created campaign");
        Ok(CreatedCampaign {
            tracking_url: tracking_url(&self.tracking_base_url, &tracking_id),
            campaign_id,
            tracking_id,
        })
    }

    async fn update_campaign(&self, request: UpdateCampaignRequest) -> Result<(), Error> {
        let UpdateCampaignRequest {
            caller,
            org_id,
            campaign_id,
            patch,
        } = request;
        self.tenants.authorize(&caller, &org_id).await?;

        let Some(mut campaign) = self.campaigns.find(&org_id, &campaign_id).await? else {
            return Err(Error::not_found(format!(
                "campaign {campaign_id} not found"
            )));
        };
        let retarget_link = patch.cta_url.is_some();
        campaign.apply(patch, self.clock.utc());
        self.campaigns.update(&campaign, retarget_link).await?;

        info!(
            org_id = %org_id,
            campaign_id = %campaign_id,
            retarget_link,
            "updated campaign"
        );
        Ok(())
    }

    async fn list_campaigns(
        &self,
        caller: &UserId,
        org_id: &OrgId,
    ) -> Result<Vec<NewsletterCampaign>, Error> {
        self.tenants.authorize(caller, org_id).await?;
        Ok(self.campaigns.list(org_id).await?)
    }
}
