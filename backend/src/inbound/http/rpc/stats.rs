//! `getConversionStats` and `getConversionReport`.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::OrgScopedRequest;
use crate::domain::{ConversionReport, ConversionStats, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_optional_campaign_id, parse_org_id};

/// Funnel query, optionally narrowed to one campaign.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ConversionStatsBody {
    pub org_id: String,
    #[serde(default)]
    pub campaign_id: Option<String>,
}

/// Open/click counts and rates.
#[utoipa::path(
    post,
    path = "/api/v1/rpc/getConversionStats",
    request_body = ConversionStatsBody,
    responses(
        (status = 200, description = "Funnel counts", body = ConversionStats),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Organisation belongs to someone else", body = Error)
    ),
    tags = ["stats"],
    operation_id = "getConversionStats"
)]
#[post("/rpc/getConversionStats")]
pub async fn get_conversion_stats(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ConversionStatsBody>,
) -> ApiResult<web::Json<ConversionStats>> {
    let caller = session.require_user_id()?;
    let ConversionStatsBody {
        org_id,
        campaign_id,
    } = payload.into_inner();
    let org_id = parse_org_id(org_id)?;
    let campaign_id = parse_optional_campaign_id(campaign_id)?;
    let stats = state
        .stats
        .conversion_stats(&caller, &org_id, campaign_id)
        .await?;
    Ok(web::Json(stats))
}

/// Dashboard summary.
#[utoipa::path(
    post,
    path = "/api/v1/rpc/getConversionReport",
    request_body = OrgScopedRequest,
    responses(
        (status = 200, description = "Report", body = ConversionReport),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Organisation belongs to someone else", body = Error)
    ),
    tags = ["stats"],
    operation_id = "getConversionReport"
)]
#[post("/rpc/getConversionReport")]
pub async fn get_conversion_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OrgScopedRequest>,
) -> ApiResult<web::Json<ConversionReport>> {
    let caller = session.require_user_id()?;
    let org_id = parse_org_id(payload.into_inner().org_id)?;
    let report = state.stats.conversion_report(&caller, &org_id).await?;
    Ok(web::Json(report))
}
