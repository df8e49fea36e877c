//! PostgreSQL-backed `OrgRepository` implementation using Diesel ORM.
//!
//! Provisioning runs in one transaction guarded by a per-user advisory lock:
//! a second concurrent caller blocks until the first commits, then observes
//! the committed mapping and returns it instead of creating another org.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{OrgRepository, OrgRepositoryError};
use crate::domain::{OrgId, UserId};

use super::diesel_basic_error_mapping::basic_error_mappers;
use super::diesel_helpers::{advisory_xact_lock, stored};
use super::models::{NewOrgMemberRow, NewOrgRow, NewUserOrgRow};
use super::pool::DbPool;
use super::schema::{org_members, orgs, user_orgs};

const OWNER_ROLE: &str = "owner";

/// Diesel-backed implementation of the [`OrgRepository`] port.
#[derive(Clone)]
pub struct DieselOrgRepository {
    pool: DbPool,
}

impl DieselOrgRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mappers!(OrgRepositoryError);

fn to_org_id(raw: String) -> Result<OrgId, OrgRepositoryError> {
    stored(OrgId::new(raw), "org id").map_err(|message| OrgRepositoryError::query(message))
}

#[async_trait]
impl OrgRepository for DieselOrgRepository {
    async fn find_org_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<OrgId>, OrgRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let org: Option<String> = user_orgs::table
            .filter(user_orgs::user_id.eq(user_id.as_uuid()))
            .select(user_orgs::org_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        org.map(to_org_id).transpose()
    }

    async fn provision(
        &self,
        user_id: &UserId,
        candidate: &OrgId,
    ) -> Result<OrgId, OrgRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_uuid = *user_id.as_uuid();
        let lock_key = format!("user_org:{user_uuid}");
        let candidate_id = candidate.as_ref().to_owned();

        let winner: String = conn
            .transaction(|conn| {
                async move {
                    advisory_xact_lock(conn, &lock_key).await?;

                    let existing: Option<String> = user_orgs::table
                        .filter(user_orgs::user_id.eq(user_uuid))
                        .select(user_orgs::org_id)
                        .first(conn)
                        .await
                        .optional()?;
                    if let Some(existing) = existing {
                        return Ok(existing);
                    }

                    diesel::insert_into(orgs::table)
                        .values(NewOrgRow { id: &candidate_id })
                        .execute(conn)
                        .await?;
                    diesel::insert_into(org_members::table)
                        .values(NewOrgMemberRow {
                            org_id: &candidate_id,
                            user_id: user_uuid,
                            role: OWNER_ROLE,
                        })
                        .execute(conn)
                        .await?;
                    diesel::insert_into(user_orgs::table)
                        .values(NewUserOrgRow {
                            user_id: user_uuid,
                            org_id: &candidate_id,
                        })
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(candidate_id)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        to_org_id(winner)
    }
}
