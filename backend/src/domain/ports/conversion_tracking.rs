//! Driving port for tracking links and conversion recording.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{
    CampaignId, ConversionEvent, ConversionTarget, Error, LegacyClick, OrgId, TrackingId, UserId,
};

/// Request to wrap raw newsletter URLs in tracking links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureTrackingLinksRequest {
    pub caller: UserId,
    pub org_id: OrgId,
    pub campaign_id: CampaignId,
    /// Raw destination URLs; blank entries are ignored.
    pub urls: Vec<String>,
}

/// Use-case port for the public tracking surface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversionTracking: Send + Sync {
    /// Resolve a tracking id and log the event unless an identical one was
    /// logged within the dedup window.
    ///
    /// # Errors
    ///
    /// Returns `not_found` for unknown ids; no log row is written then.
    async fn record_conversion(
        &self,
        tracking_id: &TrackingId,
        event: ConversionEvent,
    ) -> Result<ConversionTarget, Error>;

    /// Log a click from the deprecated query-string redirect, without dedup.
    async fn record_legacy_click(&self, click: LegacyClick) -> Result<(), Error>;

    /// Map each URL to a tracking id, reusing links that already exist for
    /// the same campaign and destination.
    async fn ensure_tracking_links(
        &self,
        request: EnsureTrackingLinksRequest,
    ) -> Result<BTreeMap<String, TrackingId>, Error>;
}
