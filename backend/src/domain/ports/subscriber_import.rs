//! Driving port for CSV subscriber imports.

use async_trait::async_trait;

use crate::domain::{ContentHash, Error, ImportOutcome, OrgId, UserId};

/// Request to import subscribers from CSV text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSubscribersRequest {
    /// Authenticated caller; must belong to `org_id`.
    pub caller: UserId,
    pub org_id: OrgId,
    pub csv_text: String,
    /// Content hash of `csv_text`, used as the idempotency token.
    pub file_hash: ContentHash,
}

/// Use-case port behind the `importSubscribers` callable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberImport: Send + Sync {
    /// Import the emails found in the CSV, counting only net-new rows as
    /// imported.
    ///
    /// # Errors
    ///
    /// Returns `permission_denied` when the caller does not belong to the
    /// target organisation; nothing is written in that case.
    async fn import_subscribers(
        &self,
        request: ImportSubscribersRequest,
    ) -> Result<ImportOutcome, Error>;
}
