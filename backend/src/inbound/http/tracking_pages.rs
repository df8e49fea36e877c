//! Public tracking surface hit by newsletter recipients.
//!
//! ```text
//! GET /t/{tracking_id}                    302 to the destination
//! GET /t/{tracking_id}/open               204 open beacon
//! GET /api/v1/track?orgId&cid&uid&target  deprecated redirect
//! GET /api/v1/conversionReport?org_id=    CORS-open report
//! ```

use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpResponse, ResponseError, get, options, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use utoipa::IntoParams;

use crate::domain::{
    CampaignId, ConversionEvent, Error, ErrorCode, LegacyClick, OrgId, PublicConversionReport, TrackingId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const INVALID_LINK_PAGE: &str = "<!DOCTYPE html>\n\
<html lang=\"zh-Hant\">\n\
<head><meta charset=\"utf-8\"><title>Link invalid</title></head>\n\
<body><h1>連結無效</h1><p>This link is invalid or has expired.</p></body>\n\
</html>\n";

const DEPRECATION_HEADER: header::HeaderName = header::HeaderName::from_static("deprecation");

fn invalid_link_page() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(INVALID_LINK_PAGE)
}

fn redirect_to(target: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, target))
        .finish()
}

fn parse_link_id(raw_id: String) -> Result<TrackingId, HttpResponse> {
    TrackingId::new(raw_id).map_err(|err| {
        debug!(error = %err, "malformed tracking id");
        invalid_link_page()
    })
}

/// Unknown ids render the HTML page; other failures keep the JSON payload.
fn not_found_as_page(err: Error) -> HttpResponse {
    if err.code() == ErrorCode::NotFound {
        invalid_link_page()
    } else {
        err.error_response()
    }
}

/// Count a click and redirect to the destination.
#[utoipa::path(
    get,
    path = "/t/{tracking_id}",
    params(("tracking_id" = String, Path, description = "Tracking link id")),
    responses(
        (status = 302, description = "Redirect to the destination, or to the fallback when the link has none",
            headers(("Location" = String))),
        (status = 404, description = "Unknown link", content_type = "text/html", body = String)
    ),
    tags = ["tracking"],
    operation_id = "followTrackingLink",
    security([])
)]
#[get("/t/{tracking_id}")]
pub async fn follow_tracking_link(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> HttpResponse {
    let tracking_id = match parse_link_id(path.into_inner()) {
        Ok(id) => id,
        Err(page) => return page,
    };
    match state
        .tracking
        .record_conversion(&tracking_id, ConversionEvent::Click)
        .await
    {
        Ok(target) if target.target_url.is_empty() => {
            debug!(%tracking_id, "link has no destination; using fallback");
            redirect_to(&state.config.fallback_redirect_url)
        }
        Ok(target) => redirect_to(&target.target_url),
        Err(err) => not_found_as_page(err),
    }
}

/// Count an open.
#[utoipa::path(
    get,
    path = "/t/{tracking_id}/open",
    params(("tracking_id" = String, Path, description = "Tracking link id")),
    responses(
        (status = 204, description = "Open recorded"),
        (status = 404, description = "Unknown link", content_type = "text/html", body = String)
    ),
    tags = ["tracking"],
    operation_id = "trackOpen",
    security([])
)]
#[get("/t/{tracking_id}/open")]
pub async fn track_open(state: web::Data<HttpState>, path: web::Path<String>) -> HttpResponse {
    let tracking_id = match parse_link_id(path.into_inner()) {
        Ok(id) => id,
        Err(page) => return page,
    };
    match state
        .tracking
        .record_conversion(&tracking_id, ConversionEvent::Open)
        .await
    {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(err) => not_found_as_page(err),
    }
}

/// Query string of the deprecated redirect.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LegacyTrackQuery {
    #[serde(rename = "orgId")]
    pub org_id: Option<String>,
    /// Campaign id.
    pub cid: Option<String>,
    /// Recipient reference.
    pub uid: Option<String>,
    pub target: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl LegacyTrackQuery {
    fn into_click(self) -> Option<LegacyClick> {
        let org_id = OrgId::new(non_blank(self.org_id)?).ok()?;
        let target = non_blank(self.target)?;
        let campaign_id = non_blank(self.cid).and_then(|cid| {
            CampaignId::new(cid)
                .inspect_err(|err| debug!(error = %err, "ignoring malformed legacy campaign id"))
                .ok()
        });
        Some(LegacyClick {
            org_id,
            campaign_id,
            recipient_ref: non_blank(self.uid),
            target,
        })
    }
}

/// Deprecated query-string redirect. Logs one click without dedup.
#[utoipa::path(
    get,
    path = "/api/v1/track",
    params(LegacyTrackQuery),
    responses(
        (status = 302, description = "Redirect to `target`, or to the fallback when parameters are missing",
            headers(("Location" = String), ("Deprecation" = String))),
        (status = 404, description = "Legacy redirect disabled", body = Error)
    ),
    tags = ["tracking"],
    operation_id = "legacyTrack",
    security([])
)]
#[get("/track")]
pub async fn legacy_track(
    state: web::Data<HttpState>,
    query: web::Query<LegacyTrackQuery>,
) -> ApiResult<HttpResponse> {
    if !state.config.legacy_redirect_enabled {
        return Err(Error::not_found("legacy redirect is disabled"));
    }
    let mut response = match query.into_inner().into_click() {
        None => redirect_to(&state.config.fallback_redirect_url),
        Some(click) => {
            let target = click.target.clone();
            if let Err(err) = state.tracking.record_legacy_click(click).await {
                warn!(error = %err, "failed to log legacy click; redirecting anyway");
            }
            redirect_to(&target)
        }
    };
    response
        .headers_mut()
        .insert(DEPRECATION_HEADER, HeaderValue::from_static("true"));
    Ok(response)
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConversionReportQuery {
    pub org_id: Option<String>,
}

fn with_cors(mut response: HttpResponse) -> HttpResponse {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

fn bad_report_request(message: &str) -> HttpResponse {
    with_cors(HttpResponse::BadRequest().json(json!({ "error": message })))
}

/// Conversion report for embedding on third-party dashboards.
#[utoipa::path(
    get,
    path = "/api/v1/conversionReport",
    params(ConversionReportQuery),
    responses(
        (status = 200, description = "Report with rates", body = PublicConversionReport),
        (status = 400, description = "`org_id` missing or malformed")
    ),
    tags = ["stats"],
    operation_id = "publicConversionReport",
    security([])
)]
#[get("/conversionReport")]
pub async fn public_conversion_report(
    state: web::Data<HttpState>,
    query: web::Query<ConversionReportQuery>,
) -> HttpResponse {
    let Some(raw) = non_blank(query.into_inner().org_id) else {
        return bad_report_request("org_id required");
    };
    let Ok(org_id) = OrgId::new(raw) else {
        return bad_report_request("org_id invalid");
    };
    match state.stats.public_conversion_report(&org_id).await {
        Ok(report) => with_cors(HttpResponse::Ok().json(report)),
        Err(err) => with_cors(err.error_response()),
    }
}

/// CORS preflight for [`public_conversion_report`].
#[options("/conversionReport")]
pub async fn public_conversion_report_preflight() -> HttpResponse {
    with_cors(
        HttpResponse::NoContent()
            .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"))
            .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
            .finish(),
    )
}

#[cfg(test)]
#[path = "tracking_pages_tests.rs"]
mod tests;
