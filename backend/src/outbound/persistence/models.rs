//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    conversion_logs, import_logs, newsletter_campaigns, org_configs, org_members, orgs,
    subscribers, tracking_links, user_orgs,
};

// ---------------------------------------------------------------------------
// Organisations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orgs)]
pub(crate) struct NewOrgRow<'a> {
    pub id: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = org_members)]
pub(crate) struct NewOrgMemberRow<'a> {
    pub org_id: &'a str,
    pub user_id: Uuid,
    pub role: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_orgs)]
pub(crate) struct NewUserOrgRow<'a> {
    pub user_id: Uuid,
    pub org_id: &'a str,
}

// ---------------------------------------------------------------------------
// Subscribers and import logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subscribers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubscriberRow {
    pub email: String,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscribers)]
pub(crate) struct NewSubscriberRow<'a> {
    pub org_id: &'a str,
    pub email: &'a str,
    pub source: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = import_logs)]
pub(crate) struct NewImportLogRow<'a> {
    pub org_id: &'a str,
    pub file_hash: &'a str,
    pub first_imported_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Campaigns and tracking links
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = newsletter_campaigns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CampaignRow {
    pub id: String,
    pub org_id: String,
    pub title: String,
    pub body: String,
    pub cta_url: String,
    pub cta_label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = newsletter_campaigns)]
pub(crate) struct CampaignUpdate<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub cta_url: &'a str,
    pub cta_label: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tracking_links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TrackingLinkRow {
    pub id: String,
    pub org_id: String,
    pub campaign_id: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Conversion logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = conversion_logs)]
pub(crate) struct NewConversionLogRow<'a> {
    pub org_id: &'a str,
    pub tracking_id: Option<&'a str>,
    pub campaign_id: Option<&'a str>,
    pub event_type: &'a str,
    pub recipient_ref: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Org configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = org_configs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrgConfigRow {
    pub clinic_name: String,
    pub unsubscribe_base_url: String,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = org_configs)]
pub(crate) struct OrgConfigUpsert<'a> {
    pub org_id: &'a str,
    pub clinic_name: &'a str,
    pub unsubscribe_base_url: &'a str,
    pub updated_at: DateTime<Utc>,
}
