//! Port for the global tracking-link table.

use async_trait::async_trait;

use crate::domain::{CampaignId, OrgId, TrackingId, TrackingLink};

use super::define_port_error;

define_port_error! {
    /// Errors raised by tracking link repository adapters.
    pub enum TrackingLinkRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "tracking link repository connection failed: {message}"; ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "tracking link repository query failed: {message}"; InternalError,
        /// A link with this id already exists.
        DuplicateId { id: String } => "tracking link already exists: {id}"; InternalError,
    }
}

/// Persistence for tracking links. Ids are global; everything else is scoped
/// by the owning org.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackingLinkRepository: Send + Sync {
    /// Resolve a public tracking id.
    async fn find(
        &self,
        id: &TrackingId,
    ) -> Result<Option<TrackingLink>, TrackingLinkRepositoryError>;

    /// Oldest link in the campaign pointing at exactly `target_url`.
    async fn find_by_target(
        &self,
        org_id: &OrgId,
        campaign_id: &CampaignId,
        target_url: &str,
    ) -> Result<Option<TrackingLink>, TrackingLinkRepositoryError>;

    /// Store a new link.
    async fn insert(&self, link: &TrackingLink) -> Result<(), TrackingLinkRepositoryError>;
}
