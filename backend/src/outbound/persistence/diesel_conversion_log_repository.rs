//! PostgreSQL-backed `ConversionLogRepository` implementation using Diesel ORM.
//!
//! Deduplicated appends take a transaction-scoped advisory lock on
//! `(tracking id, event)` before checking the window, so two concurrent
//! requests for the same pair cannot both observe "no recent row".

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{AppendOutcome, ConversionLogRepository, ConversionLogRepositoryError};
use crate::domain::{CampaignId, ConversionEvent, ConversionLogEntry, ConversionTally, OrgId};

use super::diesel_basic_error_mapping::basic_error_mappers;
use super::diesel_helpers::advisory_xact_lock;
use super::models::NewConversionLogRow;
use super::pool::DbPool;
use super::schema::conversion_logs;

/// Diesel-backed implementation of the [`ConversionLogRepository`] port.
#[derive(Clone)]
pub struct DieselConversionLogRepository {
    pool: DbPool,
}

impl DieselConversionLogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mappers!(ConversionLogRepositoryError);

fn new_row(entry: &ConversionLogEntry) -> NewConversionLogRow<'_> {
    NewConversionLogRow {
        org_id: entry.org_id.as_ref(),
        tracking_id: entry.tracking_id.as_ref().map(AsRef::as_ref),
        campaign_id: entry.campaign_id.as_ref().map(AsRef::as_ref),
        event_type: entry.event.as_str(),
        recipient_ref: entry.recipient_ref.as_deref(),
        created_at: entry.created_at,
    }
}

fn to_count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or_default()
}

#[async_trait]
impl ConversionLogRepository for DieselConversionLogRepository {
    async fn append_unless_recent(
        &self,
        entry: &ConversionLogEntry,
        window_start: DateTime<Utc>,
    ) -> Result<AppendOutcome, ConversionLogRepositoryError> {
        let Some(tracking_id) = entry.tracking_id.as_ref() else {
            self.append(entry).await?;
            return Ok(AppendOutcome::Appended);
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let lock_key = format!("conversion:{tracking_id}:{}", entry.event.as_str());
        let row = new_row(entry);
        let tracking = tracking_id.as_ref();
        let event_type = entry.event.as_str();

        conn.transaction(|conn| {
            async move {
                advisory_xact_lock(conn, &lock_key).await?;

                let recent: bool = diesel::select(diesel::dsl::exists(
                    conversion_logs::table
                        .filter(conversion_logs::tracking_id.eq(tracking))
                        .filter(conversion_logs::event_type.eq(event_type))
                        .filter(conversion_logs::created_at.ge(window_start)),
                ))
                .get_result(conn)
                .await?;
                if recent {
                    return Ok(AppendOutcome::AlreadyLogged);
                }

                diesel::insert_into(conversion_logs::table)
                    .values(row)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(AppendOutcome::Appended)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn append(&self, entry: &ConversionLogEntry) -> Result<(), ConversionLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(conversion_logs::table)
            .values(new_row(entry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn tally(
        &self,
        org_id: &OrgId,
        campaign_id: Option<CampaignId>,
    ) -> Result<ConversionTally, ConversionLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let scoped = || {
            let mut query = conversion_logs::table
                .filter(conversion_logs::org_id.eq(org_id.as_ref().to_owned()))
                .into_boxed();
            if let Some(campaign) = campaign_id.as_ref() {
                query = query.filter(conversion_logs::campaign_id.eq(campaign.as_ref().to_owned()));
            }
            query
        };

        let opens: i64 = scoped()
            .filter(conversion_logs::event_type.eq(ConversionEvent::Open.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let clicks: i64 = scoped()
            .filter(conversion_logs::event_type.eq(ConversionEvent::Click.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let total: i64 = scoped()
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(ConversionTally {
            opens: to_count(opens),
            clicks: to_count(clicks),
            total: to_count(total),
        })
    }
}
