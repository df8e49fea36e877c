//! `ensureTrackingLinks` and `recordConversionAndGetTarget`.

use std::collections::BTreeMap;

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::EnsureTrackingLinksRequest;
use crate::domain::{ConversionEvent, ConversionTarget, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_campaign_id, parse_org_id, parse_tracking_id};

/// URLs to wrap for one campaign.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct EnsureTrackingLinksBody {
    pub org_id: String,
    pub campaign_id: String,
    /// Non-string and blank entries are ignored; at least one URL is
    /// required.
    #[schema(value_type = Vec<String>)]
    pub urls: Vec<Value>,
}

/// Destination URL to tracking id.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EnsureTrackingLinksResponse {
    pub mapping: BTreeMap<String, String>,
}

/// Public conversion beacon body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RecordConversionBody {
    pub tracking_id: String,
    /// `open` or `click`; anything else counts as a click.
    #[serde(default, rename = "type")]
    #[schema(example = "click")]
    pub event_type: Option<String>,
}

/// Wrap newsletter URLs in tracking links, reusing existing ones.
#[utoipa::path(
    post,
    path = "/api/v1/rpc/ensureTrackingLinks",
    request_body = EnsureTrackingLinksBody,
    responses(
        (status = 200, description = "URL to tracking id mapping", body = EnsureTrackingLinksResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Organisation belongs to someone else", body = Error)
    ),
    tags = ["tracking"],
    operation_id = "ensureTrackingLinks"
)]
#[post("/rpc/ensureTrackingLinks")]
pub async fn ensure_tracking_links(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EnsureTrackingLinksBody>,
) -> ApiResult<web::Json<EnsureTrackingLinksResponse>> {
    let caller = session.require_user_id()?;
    let EnsureTrackingLinksBody {
        org_id,
        campaign_id,
        urls,
    } = payload.into_inner();
    let request = EnsureTrackingLinksRequest {
        caller,
        org_id: parse_org_id(org_id)?,
        campaign_id: parse_campaign_id(campaign_id)?,
        urls: string_entries(urls)?,
    };
    let mapping = state.tracking.ensure_tracking_links(request).await?;
    Ok(web::Json(EnsureTrackingLinksResponse {
        mapping: mapping
            .into_iter()
            .map(|(url, id)| (url, id.into()))
            .collect(),
    }))
}

/// String entries of `urls`; an upload with none is a missing field.
fn string_entries(values: Vec<Value>) -> Result<Vec<String>, Error> {
    let urls: Vec<String> = values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(url) if !url.trim().is_empty() => Some(url),
            _ => None,
        })
        .collect();
    if urls.is_empty() {
        return Err(Error::missing_field("urls"));
    }
    Ok(urls)
}

/// Record an open or click and return the redirect target.
///
/// Unauthenticated: recipients hit this from newsletter links.
#[utoipa::path(
    post,
    path = "/api/v1/rpc/recordConversionAndGetTarget",
    request_body = RecordConversionBody,
    responses(
        (status = 200, description = "Resolved destination", body = ConversionTarget),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown tracking id", body = Error)
    ),
    tags = ["tracking"],
    operation_id = "recordConversionAndGetTarget",
    security([])
)]
#[post("/rpc/recordConversionAndGetTarget")]
pub async fn record_conversion_and_get_target(
    state: web::Data<HttpState>,
    payload: web::Json<RecordConversionBody>,
) -> ApiResult<web::Json<ConversionTarget>> {
    let RecordConversionBody {
        tracking_id,
        event_type,
    } = payload.into_inner();
    let tracking_id = parse_tracking_id(tracking_id)?;
    let event = ConversionEvent::from_wire(event_type.as_deref());
    let target = state.tracking.record_conversion(&tracking_id, event).await?;
    Ok(web::Json(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn non_string_urls_are_dropped() {
        let urls = string_entries(vec![
            json!("https://clinic.example"),
            json!(42),
            Value::Null,
            json!({"href": "https://x.example"}),
        ])
        .expect("one url survives");
        assert_eq!(urls, vec!["https://clinic.example".to_owned()]);
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![json!(7), Value::Null])]
    #[case(vec![json!("  ")])]
    fn urls_without_strings_are_missing(#[case] values: Vec<Value>) {
        let err = string_entries(values).expect_err("no urls");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert_eq!(
            err.details(),
            Some(&json!({"field": "urls", "code": "missing_field"}))
        );
    }

    #[test]
    fn conversion_type_defaults_when_absent() {
        let body: RecordConversionBody =
            serde_json::from_value(json!({"tracking_id": "abc"})).expect("valid body");
        assert_eq!(body.event_type, None);

        let body: RecordConversionBody =
            serde_json::from_value(json!({"tracking_id": "abc", "type": "open"}))
                .expect("valid body");
        assert_eq!(body.event_type.as_deref(), Some("open"));
    }
}
