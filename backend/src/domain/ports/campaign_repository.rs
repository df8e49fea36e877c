//! Port for newsletter campaign storage.

use async_trait::async_trait;

use crate::domain::{CampaignId, NewsletterCampaign, OrgId, TrackingLink};

use super::define_port_error;

define_port_error! {
    /// Errors raised by campaign repository adapters.
    pub enum CampaignRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "campaign repository connection failed: {message}"; ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "campaign repository query failed: {message}"; InternalError,
    }
}

/// Persistence for campaigns, scoped per org.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Store a campaign together with its CTA tracking link, atomically.
    async fn create_with_link(
        &self,
        campaign: &NewsletterCampaign,
        link: &TrackingLink,
    ) -> Result<(), CampaignRepositoryError>;

    /// Fetch one campaign of the org.
    async fn find(
        &self,
        org_id: &OrgId,
        id: &CampaignId,
    ) -> Result<Option<NewsletterCampaign>, CampaignRepositoryError>;

    /// Persist an edited campaign. With `retarget_link`, the tracking link
    /// sharing the campaign id (if any) is pointed at the new CTA URL in the
    /// same transaction.
    async fn update(
        &self,
        campaign: &NewsletterCampaign,
        retarget_link: bool,
    ) -> Result<(), CampaignRepositoryError>;

    /// Campaigns of the org, newest first.
    async fn list(&self, org_id: &OrgId) -> Result<Vec<NewsletterCampaign>, CampaignRepositoryError>;

    /// Number of campaigns the org has authored.
    async fn count(&self, org_id: &OrgId) -> Result<u64, CampaignRepositoryError>;
}
