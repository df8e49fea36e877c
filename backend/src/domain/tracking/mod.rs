//! Tracking links and conversion events.
//!
//! A tracking link maps a public opaque id to a destination URL owned by one
//! clinic. Following the link (or loading an open beacon) appends a
//! [`ConversionLogEntry`]; the dedup window in the conversion service keeps
//! retries and link-preview bots from double counting.

mod link_wrapper;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use url::form_urlencoded::byte_serialize;
use utoipa::ToSchema;

use super::opaque_id::define_opaque_id;
use super::{CampaignId, OrgId};

pub use link_wrapper::{
    extract_urls_from_blocks, extract_urls_from_html, replace_urls_in_html, tracking_url,
};

/// Query parameter carrying the clinic id on resolved targets.
pub const ORG_ID_QUERY_PARAM: &str = "org_id";

define_opaque_id! {
    /// Public identifier of a tracking link (the `:id` in `/t/:id`).
    TrackingId
}

impl From<CampaignId> for TrackingId {
    /// A campaign's CTA link shares the campaign's identifier.
    fn from(value: CampaignId) -> Self {
        Self(value.into())
    }
}

/// Kind of conversion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConversionEvent {
    Open,
    Click,
}

impl ConversionEvent {
    /// Interpret the loosely typed wire value: `"open"` is an open, anything
    /// else (including absence) is a click.
    ///
    /// # Examples
    /// ```
    /// use clinic_newsletter::domain::ConversionEvent;
    ///
    /// assert_eq!(ConversionEvent::from_wire(Some("open")), ConversionEvent::Open);
    /// assert_eq!(ConversionEvent::from_wire(Some("OPEN")), ConversionEvent::Click);
    /// assert_eq!(ConversionEvent::from_wire(None), ConversionEvent::Click);
    /// ```
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            Some("open") => Self::Open,
            _ => Self::Click,
        }
    }

    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Click => "click",
        }
    }
}

impl fmt::Display for ConversionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored event type is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown conversion event type: {0}")]
pub struct ParseConversionEventError(pub String);

impl std::str::FromStr for ConversionEvent {
    type Err = ParseConversionEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "click" => Ok(Self::Click),
            other => Err(ParseConversionEventError(other.to_owned())),
        }
    }
}

/// Mapping from a public tracking id to a clinic-owned destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingLink {
    pub id: TrackingId,
    pub org_id: OrgId,
    pub campaign_id: CampaignId,
    /// Destination URL as authored; may be blank for campaigns without a CTA.
    pub target_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TrackingLink {
    /// Build a new link created at `at`.
    pub fn new(
        id: TrackingId,
        org_id: OrgId,
        campaign_id: CampaignId,
        target_url: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            org_id,
            campaign_id,
            target_url: target_url.into(),
            created_at: at,
            updated_at: None,
        }
    }

    /// Destination with the owning clinic appended for downstream attribution.
    ///
    /// Empty when the link has no destination, so callers can pick their own
    /// fallback instead of redirecting to a bare query string.
    pub fn resolved_target(&self) -> String {
        if self.target_url.trim().is_empty() {
            return String::new();
        }
        append_org_id(&self.target_url, &self.org_id)
    }
}

/// Append-only record of an open or click.
///
/// Entries written by the canonical path always carry the tracking and
/// campaign ids. Rows from the deprecated query-string redirect may lack
/// both, and carry the opaque recipient reference instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionLogEntry {
    pub org_id: OrgId,
    pub tracking_id: Option<TrackingId>,
    pub campaign_id: Option<CampaignId>,
    pub event: ConversionEvent,
    pub recipient_ref: Option<String>,
    /// Server-assigned; never taken from the client.
    pub created_at: DateTime<Utc>,
}

impl ConversionLogEntry {
    /// Entry for an event on a known tracking link.
    pub fn for_link(link: &TrackingLink, event: ConversionEvent, at: DateTime<Utc>) -> Self {
        Self {
            org_id: link.org_id.clone(),
            tracking_id: Some(link.id.clone()),
            campaign_id: Some(link.campaign_id.clone()),
            event,
            recipient_ref: None,
            created_at: at,
        }
    }
}

/// Outcome of recording a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConversionTarget {
    #[schema(example = "https://clinic.example/booking?org_id=org_abc")]
    pub target_url: String,
    /// `true` when an identical event inside the dedup window suppressed the
    /// write.
    pub already_logged: bool,
}

/// Click reported through the deprecated query-string redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyClick {
    pub org_id: OrgId,
    pub campaign_id: Option<CampaignId>,
    pub recipient_ref: Option<String>,
    pub target: String,
}

/// Set `org_id` on `url`, replacing any existing value.
///
/// Destinations are authored by clinics and may be malformed; when the URL
/// does not parse, the parameter is appended by plain concatenation instead.
///
/// # Examples
/// ```
/// use clinic_newsletter::domain::{OrgId, append_org_id};
///
/// let org = OrgId::new("org_abc").unwrap();
/// assert_eq!(
///     append_org_id("https://clinic.example/book?x=1", &org),
///     "https://clinic.example/book?x=1&org_id=org_abc"
/// );
/// assert_eq!(append_org_id("not a url", &org), "not a url?org_id=org_abc");
/// ```
pub fn append_org_id(url: &str, org_id: &OrgId) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            let retained: Vec<(String, String)> = parsed
                .query_pairs()
                .filter(|(key, _)| key != ORG_ID_QUERY_PARAM)
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect();
            parsed
                .query_pairs_mut()
                .clear()
                .extend_pairs(retained)
                .append_pair(ORG_ID_QUERY_PARAM, org_id.as_ref());
            parsed.into()
        }
        Err(_) => {
            let encoded: String = byte_serialize(org_id.as_ref().as_bytes()).collect();
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{url}{separator}{ORG_ID_QUERY_PARAM}={encoded}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn org() -> OrgId {
        OrgId::new("org_abc123").expect("valid org")
    }

    #[rstest]
    #[case("https://clinic.example", "https://clinic.example/?org_id=org_abc123")]
    #[case(
        "https://clinic.example/book?org_id=stale&x=1",
        "https://clinic.example/book?x=1&org_id=org_abc123"
    )]
    #[case("clinic.example/book?x=1", "clinic.example/book?x=1&org_id=org_abc123")]
    #[case("", "?org_id=org_abc123")]
    fn appends_org_id(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(append_org_id(url, &org()), expected);
    }

    #[rstest]
    #[case("open", Ok(ConversionEvent::Open))]
    #[case("click", Ok(ConversionEvent::Click))]
    #[case("view", Err(ParseConversionEventError("view".to_owned())))]
    fn parses_stored_event_types(
        #[case] raw: &str,
        #[case] expected: Result<ConversionEvent, ParseConversionEventError>,
    ) {
        assert_eq!(raw.parse::<ConversionEvent>(), expected);
    }

    #[rstest]
    fn campaign_links_share_the_campaign_id() {
        let campaign = CampaignId::new("cmp123").expect("valid");
        let tracking: TrackingId = campaign.clone().into();
        assert_eq!(tracking.as_ref(), campaign.as_ref());
    }

    #[rstest]
    #[case("", "")]
    #[case("   ", "")]
    #[case("https://clinic.example/book", "https://clinic.example/book?org_id=org_abc123")]
    fn resolved_target_is_empty_without_a_destination(
        #[case] target_url: &str,
        #[case] expected: &str,
    ) {
        let link = TrackingLink::new(
            TrackingId::generate(),
            org(),
            CampaignId::generate(),
            target_url,
            Utc::now(),
        );
        assert_eq!(link.resolved_target(), expected);
    }

    #[rstest]
    fn entries_for_links_copy_ownership() {
        let link = TrackingLink::new(
            TrackingId::generate(),
            org(),
            CampaignId::generate(),
            "https://clinic.example",
            Utc::now(),
        );
        let entry = ConversionLogEntry::for_link(&link, ConversionEvent::Open, link.created_at);
        assert_eq!(entry.org_id, link.org_id);
        assert_eq!(entry.tracking_id.as_ref(), Some(&link.id));
        assert_eq!(entry.campaign_id.as_ref(), Some(&link.campaign_id));
    }
}
