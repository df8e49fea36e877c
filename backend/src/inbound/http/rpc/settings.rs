//! Org configuration and data export callables.

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::{OkResponse, OrgScopedRequest};
use crate::domain::ports::ExportOrgDataRequest;
use crate::domain::{Error, OrgConfig, OrgDataExport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::idempotency::{IDEMPOTENT_REPLAYED_HEADER, extract_idempotency_key};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_org_id;

/// Footer settings; absent fields are stored as empty strings.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SetOrgConfigBody {
    pub org_id: String,
    #[serde(default)]
    pub clinic_name: Option<String>,
    #[serde(default)]
    pub unsubscribe_base_url: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/rpc/getOrgConfig",
    request_body = OrgScopedRequest,
    responses(
        (status = 200, description = "Newsletter footer settings", body = OrgConfig),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Organisation belongs to someone else", body = Error)
    ),
    tags = ["orgs"],
    operation_id = "getOrgConfig"
)]
#[post("/rpc/getOrgConfig")]
pub async fn get_org_config(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OrgScopedRequest>,
) -> ApiResult<web::Json<OrgConfig>> {
    let caller = session.require_user_id()?;
    let org_id = parse_org_id(payload.into_inner().org_id)?;
    let config = state.settings.org_config(&caller, &org_id).await?;
    Ok(web::Json(config))
}

#[utoipa::path(
    post,
    path = "/api/v1/rpc/setOrgConfig",
    request_body = SetOrgConfigBody,
    responses(
        (status = 200, description = "Settings saved", body = OkResponse),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Organisation belongs to someone else", body = Error)
    ),
    tags = ["orgs"],
    operation_id = "setOrgConfig"
)]
#[post("/rpc/setOrgConfig")]
pub async fn set_org_config(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SetOrgConfigBody>,
) -> ApiResult<web::Json<OkResponse>> {
    let caller = session.require_user_id()?;
    let SetOrgConfigBody {
        org_id,
        clinic_name,
        unsubscribe_base_url,
    } = payload.into_inner();
    let org_id = parse_org_id(org_id)?;
    let config = OrgConfig::from_parts(clinic_name, unsubscribe_base_url);
    state
        .settings
        .set_org_config(&caller, &org_id, config)
        .await?;
    Ok(OkResponse::ok())
}

/// Snapshot subscribers and campaigns.
///
/// With `X-Idempotency-Key`, a retry inside the replay TTL returns the first
/// response and sets `Idempotent-Replayed: true`.
#[utoipa::path(
    post,
    path = "/api/v1/rpc/exportOrgData",
    request_body = OrgScopedRequest,
    params(
        ("X-Idempotency-Key" = Option<String>, Header, description = "Replay key for retries")
    ),
    responses(
        (status = 200, description = "Export document", body = OrgDataExport,
            headers(("Idempotent-Replayed" = String, description = "`true` when served from the replay cache"))),
        (status = 400, description = "Invalid idempotency key", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Organisation belongs to someone else", body = Error)
    ),
    tags = ["orgs"],
    operation_id = "exportOrgData"
)]
#[post("/rpc/exportOrgData")]
pub async fn export_org_data(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    payload: web::Json<OrgScopedRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let idempotency_key = extract_idempotency_key(request.headers())?;
    let org_id = parse_org_id(payload.into_inner().org_id)?;
    let response = state
        .exports
        .export_org_data(ExportOrgDataRequest {
            caller,
            org_id,
            idempotency_key,
        })
        .await?;

    let mut builder = HttpResponse::Ok();
    if response.replayed {
        debug!("replaying cached export");
        builder.insert_header((IDEMPOTENT_REPLAYED_HEADER, "true"));
    }
    Ok(builder.json(response.export))
}
