//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod campaign_repository;
mod conversion_log_repository;
mod conversion_stats_query;
mod conversion_tracking;
mod login_service;
mod newsletter_campaigns;
mod org_config_repository;
mod org_data_export;
mod org_provisioning;
mod org_repository;
mod org_settings;
mod response_cache;
mod subscriber_import;
mod subscriber_repository;
mod tracking_link_repository;

pub use cache_key::{ResponseCacheKey, ResponseCacheKeyValidationError};
#[cfg(test)]
pub use campaign_repository::MockCampaignRepository;
pub use campaign_repository::{CampaignRepository, CampaignRepositoryError};
#[cfg(test)]
pub use conversion_log_repository::MockConversionLogRepository;
pub use conversion_log_repository::{
    AppendOutcome, ConversionLogRepository, ConversionLogRepositoryError,
};
#[cfg(test)]
pub use conversion_stats_query::MockConversionStatsQuery;
pub use conversion_stats_query::ConversionStatsQuery;
#[cfg(test)]
pub use conversion_tracking::MockConversionTracking;
pub use conversion_tracking::{ConversionTracking, EnsureTrackingLinksRequest};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{ConfiguredAccount, ConfiguredLoginService, LoginService};
#[cfg(test)]
pub use newsletter_campaigns::MockNewsletterCampaigns;
pub use newsletter_campaigns::{
    CreateCampaignRequest, CreatedCampaign, NewsletterCampaigns, UpdateCampaignRequest,
};
#[cfg(test)]
pub use org_config_repository::MockOrgConfigRepository;
pub use org_config_repository::{OrgConfigRepository, OrgConfigRepositoryError};
#[cfg(test)]
pub use org_data_export::MockOrgDataExporter;
pub use org_data_export::{ExportOrgDataRequest, ExportOrgDataResponse, OrgDataExporter};
#[cfg(test)]
pub use org_provisioning::MockOrgProvisioning;
pub use org_provisioning::OrgProvisioning;
#[cfg(test)]
pub use org_repository::MockOrgRepository;
pub use org_repository::{OrgRepository, OrgRepositoryError};
#[cfg(test)]
pub use org_settings::MockOrgSettings;
pub use org_settings::OrgSettings;
#[cfg(test)]
pub use response_cache::MockResponseCache;
pub use response_cache::{ResponseCache, ResponseCacheError};
#[cfg(test)]
pub use subscriber_import::MockSubscriberImport;
pub use subscriber_import::{ImportSubscribersRequest, SubscriberImport};
#[cfg(test)]
pub use subscriber_repository::MockSubscriberRepository;
pub use subscriber_repository::{SubscriberRepository, SubscriberRepositoryError};
#[cfg(test)]
pub use tracking_link_repository::MockTrackingLinkRepository;
pub use tracking_link_repository::{TrackingLinkRepository, TrackingLinkRepositoryError};
