//! Callable endpoints under `POST /api/v1/rpc/{name}`.
//!
//! Every body is a snake_case JSON object with `deny_unknown_fields`; a
//! missing required field surfaces as `invalid_argument` carrying
//! `{field, code: "missing_field"}` through [`json_config`].
//!
//! [`json_config`]: crate::inbound::http::validation::json_config

pub mod campaigns;
pub mod orgs;
pub mod settings;
pub mod stats;
pub mod subscribers;
pub mod tracking;

use actix_web::web;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body shared by callables that only name the target clinic.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct OrgScopedRequest {
    #[schema(example = "org_k3j9x0a1b2c3")]
    pub org_id: String,
}

/// Acknowledgement for mutations without a payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub(crate) fn ok() -> web::Json<Self> {
        web::Json(Self { ok: true })
    }
}

/// Register every callable on the enclosing scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(orgs::ensure_org_for_user)
        .service(subscribers::import_subscribers)
        .service(tracking::ensure_tracking_links)
        .service(tracking::record_conversion_and_get_target)
        .service(stats::get_conversion_stats)
        .service(stats::get_conversion_report)
        .service(campaigns::create_newsletter_campaign)
        .service(campaigns::update_newsletter_campaign)
        .service(campaigns::list_newsletter_campaigns)
        .service(settings::get_org_config)
        .service(settings::set_org_config)
        .service(settings::export_org_data);
}

#[cfg(test)]
mod tests;
