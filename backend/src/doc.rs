//! OpenAPI document for the HTTP surface.
//!
//! Served by Swagger UI at `/docs` in debug builds and printed by the
//! `openapi-dump` binary for client generation.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::CreatedCampaign;
use crate::domain::{
    ConversionReport, ConversionStats, ConversionTarget, Error, ErrorCode, ExportedCampaign,
    ImportOutcome, OrgConfig, OrgDataExport, PublicConversionReport,
};
use crate::inbound::http::rpc::campaigns::{
    CampaignListResponse, CreateCampaignBody, UpdateCampaignBody,
};
use crate::inbound::http::rpc::orgs::EnsureOrgResponse;
use crate::inbound::http::rpc::settings::SetOrgConfigBody;
use crate::inbound::http::rpc::stats::ConversionStatsBody;
use crate::inbound::http::rpc::subscribers::ImportSubscribersBody;
use crate::inbound::http::rpc::tracking::{
    EnsureTrackingLinksBody, EnsureTrackingLinksResponse, RecordConversionBody,
};
use crate::inbound::http::rpc::{OkResponse, OrgScopedRequest};
use crate::inbound::http::users::LoginRequest;

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Clinic newsletter API",
        description = "Org provisioning, subscriber imports, campaign authoring and conversion tracking for clinic newsletters."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::rpc::orgs::ensure_org_for_user,
        crate::inbound::http::rpc::subscribers::import_subscribers,
        crate::inbound::http::rpc::tracking::ensure_tracking_links,
        crate::inbound::http::rpc::tracking::record_conversion_and_get_target,
        crate::inbound::http::rpc::stats::get_conversion_stats,
        crate::inbound::http::rpc::stats::get_conversion_report,
        crate::inbound::http::rpc::campaigns::create_newsletter_campaign,
        crate::inbound::http::rpc::campaigns::update_newsletter_campaign,
        crate::inbound::http::rpc::campaigns::list_newsletter_campaigns,
        crate::inbound::http::rpc::settings::get_org_config,
        crate::inbound::http::rpc::settings::set_org_config,
        crate::inbound::http::rpc::settings::export_org_data,
        crate::inbound::http::tracking_pages::follow_tracking_link,
        crate::inbound::http::tracking_pages::track_open,
        crate::inbound::http::tracking_pages::legacy_track,
        crate::inbound::http::tracking_pages::public_conversion_report,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginRequest,
        OrgScopedRequest,
        OkResponse,
        EnsureOrgResponse,
        ImportSubscribersBody,
        ImportOutcome,
        EnsureTrackingLinksBody,
        EnsureTrackingLinksResponse,
        RecordConversionBody,
        ConversionTarget,
        ConversionStatsBody,
        ConversionStats,
        ConversionReport,
        PublicConversionReport,
        CreateCampaignBody,
        UpdateCampaignBody,
        CreatedCampaign,
        CampaignListResponse,
        ExportedCampaign,
        SetOrgConfigBody,
        OrgConfig,
        OrgDataExport,
    )),
    tags(
        (name = "session", description = "Cookie session sign in"),
        (name = "orgs", description = "Clinic provisioning, settings and export"),
        (name = "subscribers", description = "CSV subscriber imports"),
        (name = "campaigns", description = "Newsletter campaign authoring"),
        (name = "tracking", description = "Tracking links and conversion beacons"),
        (name = "stats", description = "Conversion funnel reporting"),
        (name = "health", description = "Orchestrator probes")
    )
)]
pub struct ApiDoc;
