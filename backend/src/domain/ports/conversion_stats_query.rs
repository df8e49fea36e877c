//! Driving port for funnel statistics.

use async_trait::async_trait;

use crate::domain::{
    CampaignId, ConversionReport, ConversionStats, Error, OrgId, PublicConversionReport, UserId,
};

/// Read-side use-cases over conversion logs.
///
/// Organisations without any logs yield zero-valued aggregates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversionStatsQuery: Send + Sync {
    /// Opens, clicks and rates for the org, optionally for one campaign.
    async fn conversion_stats(
        &self,
        caller: &UserId,
        org_id: &OrgId,
        campaign_id: Option<CampaignId>,
    ) -> Result<ConversionStats, Error>;

    /// Dashboard summary for the caller's org.
    async fn conversion_report(
        &self,
        caller: &UserId,
        org_id: &OrgId,
    ) -> Result<ConversionReport, Error>;

    /// Summary with rates for the unauthenticated reporting endpoint.
    async fn public_conversion_report(
        &self,
        org_id: &OrgId,
    ) -> Result<PublicConversionReport, Error>;
}
