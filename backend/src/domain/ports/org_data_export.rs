//! Driving port for clinic data export.
//!
//! Exports are read-only but expensive for the client to regenerate (it
//! renders them to PDF), so a retry carrying the same idempotency key replays
//! the first response instead of taking a new snapshot.

use async_trait::async_trait;

use crate::domain::{Error, IdempotencyKey, OrgDataExport, OrgId, UserId};

/// Request to export an organisation's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOrgDataRequest {
    pub caller: UserId,
    pub org_id: OrgId,
    /// Optional key for replaying a previous response.
    pub idempotency_key: Option<IdempotencyKey>,
}

/// Export document plus whether it came from the replay cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOrgDataResponse {
    pub export: OrgDataExport,
    pub replayed: bool,
}

/// Use-case port behind `exportOrgData`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrgDataExporter: Send + Sync {
    /// Snapshot subscribers and campaigns.
    async fn export_org_data(
        &self,
        request: ExportOrgDataRequest,
    ) -> Result<ExportOrgDataResponse, Error>;
}
