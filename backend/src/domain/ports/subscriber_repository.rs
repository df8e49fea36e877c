//! Port for subscriber storage and the per-org import log.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::{ContentHash, EmailAddress, ImportLog, OrgId, Subscriber};

use super::define_port_error;

define_port_error! {
    /// Errors raised by subscriber repository adapters.
    pub enum SubscriberRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "subscriber repository connection failed: {message}"; ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "subscriber repository query failed: {message}"; InternalError,
    }
}

/// Persistence for subscribers, keyed by (org, email).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Whether content with this hash was imported for the org before.
    async fn import_log_exists(
        &self,
        org_id: &OrgId,
        file_hash: &ContentHash,
    ) -> Result<bool, SubscriberRepositoryError>;

    /// The subset of `emails` already stored for the org.
    async fn existing_emails(
        &self,
        org_id: &OrgId,
        emails: &[EmailAddress],
    ) -> Result<HashSet<EmailAddress>, SubscriberRepositoryError>;

    /// Upsert `subscribers` and, when given, record the import log entry.
    ///
    /// Upserts merge by email: an existing row keeps its identity and only has
    /// its source and `updated_at` refreshed. The log entry is written in the
    /// same transaction and is never overwritten once present.
    async fn apply_import(
        &self,
        org_id: &OrgId,
        subscribers: &[Subscriber],
        log: Option<ImportLog>,
    ) -> Result<(), SubscriberRepositoryError>;

    /// Every subscriber of the org, ordered by email.
    async fn list_subscribers(
        &self,
        org_id: &OrgId,
    ) -> Result<Vec<Subscriber>, SubscriberRepositoryError>;
}
