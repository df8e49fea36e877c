//! Port for the append-only conversion log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CampaignId, ConversionLogEntry, ConversionTally, OrgId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by conversion log adapters.
    pub enum ConversionLogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "conversion log connection failed: {message}"; ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "conversion log query failed: {message}"; InternalError,
    }
}

/// Whether a deduplicated append wrote a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    AlreadyLogged,
}

/// Append-only storage for open and click events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversionLogRepository: Send + Sync {
    /// Append `entry` unless a row with the same tracking id and event type
    /// was created after `window_start`.
    ///
    /// Adapters serialise the check and the insert per (tracking id, event),
    /// so concurrent duplicates inside the window produce exactly one row.
    async fn append_unless_recent(
        &self,
        entry: &ConversionLogEntry,
        window_start: DateTime<Utc>,
    ) -> Result<AppendOutcome, ConversionLogRepositoryError>;

    /// Append without any dedup.
    async fn append(&self, entry: &ConversionLogEntry) -> Result<(), ConversionLogRepositoryError>;

    /// Count opens, clicks and all rows for the org, optionally restricted
    /// to one campaign.
    async fn tally(
        &self,
        org_id: &OrgId,
        campaign_id: Option<CampaignId>,
    ) -> Result<ConversionTally, ConversionLogRepositoryError>;
}
