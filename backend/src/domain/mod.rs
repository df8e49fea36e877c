//! Domain primitives, aggregates, and services.
//!
//! Purpose: model clinics, subscribers, tracking links, and conversion logs
//! independently of transport and storage. Types validate on construction so
//! adapters cannot smuggle malformed identifiers past the boundary.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - OrgId, UserId, TrackingId, CampaignId — validated identifiers.
//! - Services implementing the driving ports in [`ports`].

pub mod auth;
pub mod campaign;
mod campaign_service;
pub mod conversion_stats;
mod conversion_stats_service;
mod conversion_tracking_service;
pub mod error;
pub mod export;
pub mod idempotency;
mod opaque_id;
pub mod org;
pub mod org_config;
mod org_data_export_service;
mod org_provisioning_service;
mod org_settings_service;
pub mod ports;
pub mod subscriber;
mod subscriber_import_service;
mod tenant_guard;
pub mod trace_id;
pub mod tracking;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::campaign::{
    CampaignDraft, CampaignId, CampaignPatch, CampaignValidationError, DEFAULT_CTA_LABEL,
    NewsletterBlock, NewsletterCampaign,
};
pub use self::campaign_service::CampaignService;
pub use self::conversion_stats::{
    ConversionReport, ConversionStats, ConversionTally, PublicConversionReport, percentage,
};
pub use self::conversion_stats_service::ConversionStatsService;
pub use self::conversion_tracking_service::ConversionTrackingService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::export::{EXPORT_FORMAT_VERSION, ExportedCampaign, OrgDataExport, OrgDataExportData};
pub use self::idempotency::{
    CONTENT_HASH_MAX, ContentHash, ContentHashValidationError, IDEMPOTENCY_KEY_HEADER,
    IDEMPOTENCY_KEY_MAX, IdempotencyConfig, IdempotencyKey, IdempotencyKeyValidationError,
    ImportHashPolicy,
};
pub use self::opaque_id::OpaqueIdValidationError;
pub use self::org::{ORG_ID_MAX, OrgId, OrgIdValidationError};
pub use self::org_config::OrgConfig;
pub use self::org_data_export_service::OrgDataExportService;
pub use self::org_provisioning_service::OrgProvisioningService;
pub use self::org_settings_service::OrgSettingsService;
pub use self::subscriber::{
    CSV_IMPORT_SOURCE, EmailAddress, EmailValidationError, ImportLog, ImportOutcome, Subscriber,
    parse_csv_emails,
};
pub use self::subscriber_import_service::SubscriberImportService;
pub use self::tenant_guard::TenantGuard;
pub use self::trace_id::TraceId;
pub use self::tracking::{
    ConversionEvent, ConversionLogEntry, ConversionTarget, LegacyClick, ORG_ID_QUERY_PARAM,
    ParseConversionEventError, TrackingId, TrackingLink, append_org_id, extract_urls_from_blocks,
    extract_urls_from_html, replace_urls_in_html, tracking_url,
};
pub use self::user::{UserId, UserIdValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use clinic_newsletter::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::permission_denied("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
