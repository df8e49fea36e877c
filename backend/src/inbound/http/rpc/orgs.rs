//! `ensureOrgForUser`.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Organisation owned by the caller.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EnsureOrgResponse {
    #[schema(example = "org_k3j9x0a1b2c3")]
    pub org_id: String,
}

/// Return the caller's clinic, provisioning one on first use.
#[utoipa::path(
    post,
    path = "/api/v1/rpc/ensureOrgForUser",
    responses(
        (status = 200, description = "Caller's organisation", body = EnsureOrgResponse),
        (status = 401, description = "Not signed in", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["orgs"],
    operation_id = "ensureOrgForUser"
)]
#[post("/rpc/ensureOrgForUser")]
pub async fn ensure_org_for_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<EnsureOrgResponse>> {
    let caller = session.require_user_id()?;
    let org_id = state.provisioning.ensure_org(&caller).await?;
    Ok(web::Json(EnsureOrgResponse {
        org_id: org_id.into(),
    }))
}
