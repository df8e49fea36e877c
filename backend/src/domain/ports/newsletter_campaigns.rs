//! Driving port for campaign authoring.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    CampaignDraft, CampaignId, CampaignPatch, Error, NewsletterCampaign, OrgId, TrackingId, UserId,
};

/// Request to author a new campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCampaignRequest {
    pub caller: UserId,
    pub org_id: OrgId,
    pub draft: CampaignDraft,
}

/// Identifiers of a freshly authored campaign and its CTA tracking link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedCampaign {
    #[schema(value_type = String, example = "Xc9kq2Lr0aBvT5yUe1Zs")]
    pub campaign_id: CampaignId,
    /// Equal to `campaign_id`.
    #[schema(value_type = String, example = "Xc9kq2Lr0aBvT5yUe1Zs")]
    pub tracking_id: TrackingId,
    #[schema(example = "https://t.hetu-system.web.app/t/Xc9kq2Lr0aBvT5yUe1Zs")]
    pub tracking_url: String,
}

/// Request to edit an existing campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCampaignRequest {
    pub caller: UserId,
    pub org_id: OrgId,
    pub campaign_id: CampaignId,
    pub patch: CampaignPatch,
}

/// Use-case port for newsletter campaigns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsletterCampaigns: Send + Sync {
    /// Create a campaign and the tracking link sharing its id.
    async fn create_campaign(&self, request: CreateCampaignRequest)
    -> Result<CreatedCampaign, Error>;

    /// Apply a partial update; fails with `not_found` for unknown campaigns.
    async fn update_campaign(&self, request: UpdateCampaignRequest) -> Result<(), Error>;

    /// The org's campaigns, newest first.
    async fn list_campaigns(
        &self,
        caller: &UserId,
        org_id: &OrgId,
    ) -> Result<Vec<NewsletterCampaign>, Error>;
}
