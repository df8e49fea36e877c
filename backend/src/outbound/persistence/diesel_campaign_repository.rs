//! PostgreSQL-backed `CampaignRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{CampaignRepository, CampaignRepositoryError};
use crate::domain::{CampaignId, NewsletterCampaign, OrgId, TrackingLink};

use super::diesel_basic_error_mapping::basic_error_mappers;
use super::diesel_helpers::{campaign_to_row, collect_rows, row_to_campaign, tracking_link_to_row};
use super::models::{CampaignRow, CampaignUpdate};
use super::pool::DbPool;
use super::schema::{newsletter_campaigns, tracking_links};

/// Diesel-backed implementation of the [`CampaignRepository`] port.
#[derive(Clone)]
pub struct DieselCampaignRepository {
    pool: DbPool,
}

impl DieselCampaignRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mappers!(CampaignRepositoryError);

fn to_campaign(row: CampaignRow) -> Result<NewsletterCampaign, CampaignRepositoryError> {
    row_to_campaign(row).map_err(|message| CampaignRepositoryError::query(message))
}

#[async_trait]
impl CampaignRepository for DieselCampaignRepository {
    async fn create_with_link(
        &self,
        campaign: &NewsletterCampaign,
        link: &TrackingLink,
    ) -> Result<(), CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let campaign_row = campaign_to_row(campaign);
        let link_row = tracking_link_to_row(link);

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(newsletter_campaigns::table)
                    .values(campaign_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(tracking_links::table)
                    .values(link_row)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find(
        &self,
        org_id: &OrgId,
        id: &CampaignId,
    ) -> Result<Option<NewsletterCampaign>, CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CampaignRow> = newsletter_campaigns::table
            .filter(newsletter_campaigns::id.eq(id.as_ref()))
            .filter(newsletter_campaigns::org_id.eq(org_id.as_ref()))
            .select(CampaignRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_campaign).transpose()
    }

    async fn update(
        &self,
        campaign: &NewsletterCampaign,
        retarget_link: bool,
    ) -> Result<(), CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = campaign.id.as_ref();
        let org = campaign.org_id.as_ref();
        let changes = CampaignUpdate {
            title: &campaign.title,
            body: &campaign.body,
            cta_url: &campaign.cta_url,
            cta_label: &campaign.cta_label,
            updated_at: campaign.updated_at,
        };
        let cta_url = campaign.cta_url.as_str();
        let at = campaign.updated_at;

        conn.transaction(|conn| {
            async move {
                diesel::update(
                    newsletter_campaigns::table
                        .filter(newsletter_campaigns::id.eq(id))
                        .filter(newsletter_campaigns::org_id.eq(org)),
                )
                .set(changes)
                .execute(conn)
                .await?;
                if retarget_link {
                    diesel::update(
                        tracking_links::table
                            .filter(tracking_links::id.eq(id))
                            .filter(tracking_links::org_id.eq(org)),
                    )
                    .set((
                        tracking_links::target_url.eq(cta_url),
                        tracking_links::updated_at.eq(Some(at)),
                    ))
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

    async fn list(
        &self,
        org_id: &OrgId,
    ) -> Result<Vec<NewsletterCampaign>, CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CampaignRow> = newsletter_campaigns::table
            .filter(newsletter_campaigns::org_id.eq(org_id.as_ref()))
            .order((
                newsletter_campaigns::created_at.desc(),
                newsletter_campaigns::id.asc(),
            ))
            .select(CampaignRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(row_to_campaign), |message| {
            CampaignRepositoryError::query(message)
        })
    }

    async fn count(&self, org_id: &OrgId) -> Result<u64, CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = newsletter_campaigns::table
            .filter(newsletter_campaigns::org_id.eq(org_id.as_ref()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
