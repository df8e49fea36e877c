//! PostgreSQL-backed `OrgConfigRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OrgConfigRepository, OrgConfigRepositoryError};
use crate::domain::{OrgConfig, OrgId};

use super::diesel_basic_error_mapping::basic_error_mappers;
use super::models::{OrgConfigRow, OrgConfigUpsert};
use super::pool::DbPool;
use super::schema::org_configs;

/// Diesel-backed implementation of the [`OrgConfigRepository`] port.
#[derive(Clone)]
pub struct DieselOrgConfigRepository {
    pool: DbPool,
}

impl DieselOrgConfigRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mappers!(OrgConfigRepositoryError);

#[async_trait]
impl OrgConfigRepository for DieselOrgConfigRepository {
    async fn find(&self, org_id: &OrgId) -> Result<Option<OrgConfig>, OrgConfigRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrgConfigRow> = org_configs::table
            .find(org_id.as_ref())
            .select(OrgConfigRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|row| OrgConfig {
            clinic_name: row.clinic_name,
            unsubscribe_base_url: row.unsubscribe_base_url,
        }))
    }

    async fn save(
        &self,
        org_id: &OrgId,
        config: &OrgConfig,
        at: DateTime<Utc>,
    ) -> Result<(), OrgConfigRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let upsert = OrgConfigUpsert {
            org_id: org_id.as_ref(),
            clinic_name: &config.clinic_name,
            unsubscribe_base_url: &config.unsubscribe_base_url,
            updated_at: at,
        };
        diesel::insert_into(org_configs::table)
            .values(&upsert)
            .on_conflict(org_configs::org_id)
            .do_update()
            .set(&upsert)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
