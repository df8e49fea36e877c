//! PostgreSQL-backed `TrackingLinkRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TrackingLinkRepository, TrackingLinkRepositoryError};
use crate::domain::{CampaignId, OrgId, TrackingId, TrackingLink};

use super::diesel_basic_error_mapping::{basic_error_mappers, is_unique_violation};
use super::diesel_helpers::{row_to_tracking_link, tracking_link_to_row};
use super::models::TrackingLinkRow;
use super::pool::DbPool;
use super::schema::tracking_links;

/// Diesel-backed implementation of the [`TrackingLinkRepository`] port.
#[derive(Clone)]
pub struct DieselTrackingLinkRepository {
    pool: DbPool,
}

impl DieselTrackingLinkRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mappers!(TrackingLinkRepositoryError);

fn to_link(row: TrackingLinkRow) -> Result<TrackingLink, TrackingLinkRepositoryError> {
    row_to_tracking_link(row).map_err(|message| TrackingLinkRepositoryError::query(message))
}

#[async_trait]
impl TrackingLinkRepository for DieselTrackingLinkRepository {
    async fn find(
        &self,
        id: &TrackingId,
    ) -> Result<Option<TrackingLink>, TrackingLinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TrackingLinkRow> = tracking_links::table
            .find(id.as_ref())
            .select(TrackingLinkRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_link).transpose()
    }

    async fn find_by_target(
        &self,
        org_id: &OrgId,
        campaign_id: &CampaignId,
        target_url: &str,
    ) -> Result<Option<TrackingLink>, TrackingLinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TrackingLinkRow> = tracking_links::table
            .filter(tracking_links::org_id.eq(org_id.as_ref()))
            .filter(tracking_links::campaign_id.eq(campaign_id.as_ref()))
            .filter(tracking_links::target_url.eq(target_url))
            .order(tracking_links::created_at.asc())
            .select(TrackingLinkRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_link).transpose()
    }

    async fn insert(&self, link: &TrackingLink) -> Result<(), TrackingLinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(tracking_links::table)
            .values(tracking_link_to_row(link))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    TrackingLinkRepositoryError::duplicate_id(link.id.to_string())
                } else {
                    map_diesel_error(err)
                }
            })
    }
}
