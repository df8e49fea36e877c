//! Shared helpers for Diesel repository implementations.

use diesel::sql_types::Text;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::{CampaignId, NewsletterCampaign, OrgId, TrackingId, TrackingLink};

use super::models::{CampaignRow, TrackingLinkRow};

/// Collect converted rows, mapping the first conversion failure.
pub fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

/// Re-validate a stored value through a domain constructor.
pub fn stored<T, E: std::fmt::Display>(
    parsed: Result<T, E>,
    column: &'static str,
) -> Result<T, String> {
    parsed.map_err(|err| format!("invalid stored {column}: {err}"))
}

/// Serialise writers on `key` until the surrounding transaction ends.
pub async fn advisory_xact_lock(
    conn: &mut AsyncPgConnection,
    key: &str,
) -> Result<(), diesel::result::Error> {
    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind::<Text, _>(key)
        .execute(conn)
        .await
        .map(|_| ())
}

pub fn row_to_tracking_link(row: TrackingLinkRow) -> Result<TrackingLink, String> {
    Ok(TrackingLink {
        id: stored(TrackingId::new(row.id), "tracking id")?,
        org_id: stored(OrgId::new(row.org_id), "org id")?,
        campaign_id: stored(CampaignId::new(row.campaign_id), "campaign id")?,
        target_url: row.target_url,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub fn tracking_link_to_row(link: &TrackingLink) -> TrackingLinkRow {
    TrackingLinkRow {
        id: link.id.to_string(),
        org_id: link.org_id.to_string(),
        campaign_id: link.campaign_id.to_string(),
        target_url: link.target_url.clone(),
        created_at: link.created_at,
        updated_at: link.updated_at,
    }
}

pub fn row_to_campaign(row: CampaignRow) -> Result<NewsletterCampaign, String> {
    Ok(NewsletterCampaign {
        id: stored(CampaignId::new(row.id), "campaign id")?,
        org_id: stored(OrgId::new(row.org_id), "org id")?,
        title: row.title,
        body: row.body,
        cta_url: row.cta_url,
        cta_label: row.cta_label,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub fn campaign_to_row(campaign: &NewsletterCampaign) -> CampaignRow {
    CampaignRow {
        id: campaign.id.to_string(),
        org_id: campaign.org_id.to_string(),
        title: campaign.title.clone(),
        body: campaign.body.clone(),
        cta_url: campaign.cta_url.clone(),
        cta_label: campaign.cta_label.clone(),
        created_at: campaign.created_at,
        updated_at: campaign.updated_at,
    }
}
