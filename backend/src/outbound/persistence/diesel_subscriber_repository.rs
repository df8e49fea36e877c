//! PostgreSQL-backed `SubscriberRepository` implementation using Diesel ORM.

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{SubscriberRepository, SubscriberRepositoryError};
use crate::domain::{ContentHash, EmailAddress, ImportLog, OrgId, Subscriber};

use super::diesel_basic_error_mapping::basic_error_mappers;
use super::diesel_helpers::{collect_rows, stored};
use super::models::{NewImportLogRow, NewSubscriberRow, SubscriberRow};
use super::pool::DbPool;
use super::schema::{import_logs, subscribers};

/// Rows per upsert statement; keeps bind parameters well under the protocol
/// limit of 65535.
const UPSERT_CHUNK: usize = 1000;

/// Diesel-backed implementation of the [`SubscriberRepository`] port.
#[derive(Clone)]
pub struct DieselSubscriberRepository {
    pool: DbPool,
}

impl DieselSubscriberRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mappers!(SubscriberRepositoryError);

fn row_to_subscriber(row: SubscriberRow) -> Result<Subscriber, String> {
    Ok(Subscriber {
        email: stored(EmailAddress::parse(&row.email), "email")?,
        source: row.source,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl SubscriberRepository for DieselSubscriberRepository {
    async fn import_log_exists(
        &self,
        org_id: &OrgId,
        file_hash: &ContentHash,
    ) -> Result<bool, SubscriberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            import_logs::table
                .filter(import_logs::org_id.eq(org_id.as_ref()))
                .filter(import_logs::file_hash.eq(file_hash.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn existing_emails(
        &self,
        org_id: &OrgId,
        emails: &[EmailAddress],
    ) -> Result<HashSet<EmailAddress>, SubscriberRepositoryError> {
        if emails.is_empty() {
            return Ok(HashSet::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut found = HashSet::new();
        for chunk in emails.chunks(UPSERT_CHUNK) {
            let wanted: Vec<&str> = chunk.iter().map(AsRef::as_ref).collect();
            let rows: Vec<String> = subscribers::table
                .filter(subscribers::org_id.eq(org_id.as_ref()))
                .filter(subscribers::email.eq_any(&wanted))
                .select(subscribers::email)
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            let parsed = collect_rows(
                rows.iter()
                    .map(|raw| stored(EmailAddress::parse(raw), "email")),
                |message| SubscriberRepositoryError::query(message),
            )?;
            found.extend(parsed);
        }
        Ok(found)
    }

    async fn apply_import(
        &self,
        org_id: &OrgId,
        rows: &[Subscriber],
        log: Option<ImportLog>,
    ) -> Result<(), SubscriberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let org = org_id.as_ref();
        let new_rows: Vec<NewSubscriberRow<'_>> = rows
            .iter()
            .map(|subscriber| NewSubscriberRow {
                org_id: org,
                email: subscriber.email.as_ref(),
                source: &subscriber.source,
                updated_at: subscriber.updated_at,
            })
            .collect();

        conn.transaction(|conn| {
            async move {
                for chunk in new_rows.chunks(UPSERT_CHUNK) {
                    diesel::insert_into(subscribers::table)
                        .values(chunk)
                        .on_conflict((subscribers::org_id, subscribers::email))
                        .do_update()
                        .set((
                            subscribers::source.eq(excluded(subscribers::source)),
                            subscribers::updated_at.eq(excluded(subscribers::updated_at)),
                        ))
                        .execute(conn)
                        .await?;
                }
                if let Some(log) = log {
                    diesel::insert_into(import_logs::table)
                        .values(NewImportLogRow {
                            org_id: org,
                            file_hash: log.file_hash.as_ref(),
                            first_imported_at: log.first_imported_at,
                        })
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_subscribers(
        &self,
        org_id: &OrgId,
    ) -> Result<Vec<Subscriber>, SubscriberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SubscriberRow> = subscribers::table
            .filter(subscribers::org_id.eq(org_id.as_ref()))
            .order(subscribers::email.asc())
            .select(SubscriberRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(
            rows.into_iter().map(row_to_subscriber),
            |message| SubscriberRepositoryError::query(message),
        )
    }
}
