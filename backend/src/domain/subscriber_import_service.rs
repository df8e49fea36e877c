//! CSV subscriber import with file-hash idempotency.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    ImportSubscribersRequest, OrgRepository, SubscriberImport, SubscriberRepository,
};
use crate::domain::{
    Error, ImportHashPolicy, ImportLog, ImportOutcome, Subscriber, TenantGuard, parse_csv_emails,
};

/// Service implementing [`SubscriberImport`].
///
/// The import log marks a file hash as processed once for each org. A
/// first-seen hash upserts every parsed email (refreshing `updated_at`) and
/// writes the log entry in the same transaction; a repeated hash only inserts
/// emails that are not yet subscribers. Counts are always net-new, so
/// re-uploading a file reports `imported = 0`.
pub struct SubscriberImportService<S, O> {
    subscribers: Arc<S>,
    tenants: TenantGuard<O>,
    clock: Arc<dyn Clock>,
    hash_policy: ImportHashPolicy,
}

impl<S, O> SubscriberImportService<S, O> {
    /// Create a service trusting client-supplied file hashes.
    pub fn new(subscribers: Arc<S>, orgs: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self {
            subscribers,
            tenants: TenantGuard::new(orgs),
            clock,
            hash_policy: ImportHashPolicy::default(),
        }
    }

    /// Choose whether the supplied file hash is trusted or recomputed.
    #[must_use]
    pub fn with_hash_policy(mut self, hash_policy: ImportHashPolicy) -> Self {
        self.hash_policy = hash_policy;
        self
    }
}

#[async_trait]
impl<S, O> SubscriberImport for SubscriberImportService<S, O>
where
    S: SubscriberRepository,
    O: OrgRepository,
{
    async fn import_subscribers(
        &self,
        request: ImportSubscribersRequest,
    ) -> Result<ImportOutcome, Error> {
        let ImportSubscribersRequest {
            caller,
            org_id,
            csv_text,
            file_hash,
        } = request;
        self.tenants.authorize(&caller, &org_id).await?;

        let emails = parse_csv_emails(&csv_text);
        if emails.is_empty() {
            debug!(org_id = %org_id, "csv contained no valid emails");
            return Ok(ImportOutcome::empty());
        }

        let file_hash = self.hash_policy.effective_hash(file_hash, &csv_text);
        let seen_before = self
            .subscribers
            .import_log_exists(&org_id, &file_hash)
            .await?;
        let existing = self.subscribers.existing_emails(&org_id, &emails).await?;

        let now = self.clock.utc();
        let (fresh, present): (Vec<_>, Vec<_>) = emails
            .into_iter()
            .partition(|email| !existing.contains(email));
        let imported = fresh.len();
        let skipped = present.len();

        let mut rows: Vec<Subscriber> = fresh
            .into_iter()
            .map(|email| Subscriber::imported(email, now))
            .collect();
        let log = if seen_before {
            None
        } else {
            rows.extend(present.into_iter().map(|email| Subscriber::imported(email, now)));
            Some(ImportLog {
                file_hash: file_hash.clone(),
                first_imported_at: now,
            })
        };

        if !rows.is_empty() || log.is_some() {
            self.subscribers.apply_import(&org_id, &rows, log).await?;
        }

        info!(
            org_id = %org_id,
            file_hash = %file_hash,
            repeated_file = seen_before,
            imported,
            skipped,
            "imported subscribers"
        );
        Ok(ImportOutcome {
            imported,
            skipped,
            message: None,
        })
    }
}

#[cfg(test)]
#[path = "subscriber_import_service_tests.rs"]
mod tests;
