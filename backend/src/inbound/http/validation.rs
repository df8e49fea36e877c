//! Request validation shared by the HTTP handlers.
//!
//! Callable bodies deserialise into structs with `deny_unknown_fields`.
//! Deserialisation failures and malformed identifiers both surface as
//! `invalid_argument` errors whose details name the offending field.

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{HttpRequest, ResponseError, web};
use serde_json::json;
use tracing::debug;

use crate::domain::{CampaignId, ContentHash, Error, OrgId, TrackingId};

/// Validation error codes placed in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    InvalidValue,
    InvalidBody,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidValue => "invalid_value",
            Self::InvalidBody => "invalid_body",
        }
    }
}

/// Name of a request field, as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const ORG_ID: FieldName = FieldName::new("org_id");
pub(crate) const CAMPAIGN_ID: FieldName = FieldName::new("campaign_id");
pub(crate) const TRACKING_ID: FieldName = FieldName::new("tracking_id");
pub(crate) const FILE_HASH: FieldName = FieldName::new("file_hash");
pub(crate) const TITLE: FieldName = FieldName::new("title");

pub(crate) fn invalid_value_error(field: FieldName, reason: impl std::fmt::Display) -> Error {
    let field = field.as_str();
    Error::invalid_argument(format!("{field} is invalid: {reason}")).with_details(json!({
        "field": field,
        "code": ValidationCode::InvalidValue.as_str(),
    }))
}

/// Run `parse` on a required field, treating blank input as missing.
fn required<T, E: std::fmt::Display>(
    raw: String,
    field: FieldName,
    parse: impl FnOnce(String) -> Result<T, E>,
) -> Result<T, Error> {
    if raw.trim().is_empty() {
        return Err(Error::missing_field(field.as_str()));
    }
    parse(raw).map_err(|err| invalid_value_error(field, err))
}

pub(crate) fn parse_org_id(raw: String) -> Result<OrgId, Error> {
    required(raw, ORG_ID, OrgId::new)
}

pub(crate) fn parse_campaign_id(raw: String) -> Result<CampaignId, Error> {
    required(raw, CAMPAIGN_ID, CampaignId::new)
}

pub(crate) fn parse_optional_campaign_id(raw: Option<String>) -> Result<Option<CampaignId>, Error> {
    raw.filter(|value| !value.trim().is_empty())
        .map(parse_campaign_id)
        .transpose()
}

pub(crate) fn parse_tracking_id(raw: String) -> Result<TrackingId, Error> {
    required(raw, TRACKING_ID, TrackingId::new)
}

pub(crate) fn parse_file_hash(raw: String) -> Result<ContentHash, Error> {
    required(raw, FILE_HASH, ContentHash::new)
}

/// Field named by a serde "missing field" message.
fn missing_field_name(message: &str) -> Option<&str> {
    message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
}

fn body_error(err: &JsonPayloadError) -> Error {
    match err {
        JsonPayloadError::Deserialize(inner) => {
            let message = inner.to_string();
            match missing_field_name(&message) {
                Some(field) => Error::missing_field(field),
                None => Error::invalid_argument(format!("invalid request body: {message}"))
                    .with_details(json!({"code": ValidationCode::InvalidBody.as_str()})),
            }
        }
        other => Error::invalid_argument(format!("invalid request body: {other}"))
            .with_details(json!({"code": ValidationCode::InvalidBody.as_str()})),
    }
}

/// JSON extractor configuration rendering body errors as domain errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        let domain = body_error(&err);
        debug!(error = %err, "rejected request body");
        InternalError::from_response(err, domain.error_response()).into()
    })
}
