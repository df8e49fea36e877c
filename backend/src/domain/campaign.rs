//! Newsletter campaigns and block-based newsletter content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::OrgId;
use super::opaque_id::define_opaque_id;

/// Call-to-action label used when the author leaves it blank.
pub const DEFAULT_CTA_LABEL: &str = "立即預約";

define_opaque_id! {
    /// Identifier of a newsletter campaign within a clinic.
    CampaignId
}

/// Newsletter campaign authored by a clinic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterCampaign {
    pub id: CampaignId,
    pub org_id: OrgId,
    pub title: String,
    pub body: String,
    pub cta_url: String,
    pub cta_label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validation errors for campaign drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CampaignValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
}

/// Fields supplied when creating a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignDraft {
    title: String,
    pub body: Option<String>,
    pub cta_url: Option<String>,
    pub cta_label: Option<String>,
}

impl CampaignDraft {
    /// Build a draft; the title is required.
    pub fn new(title: impl Into<String>) -> Result<Self, CampaignValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CampaignValidationError::EmptyTitle);
        }
        Ok(Self {
            title,
            body: None,
            cta_url: None,
            cta_label: None,
        })
    }

    /// Campaign title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Materialise the campaign, filling defaults for absent fields.
    pub fn into_campaign(self, id: CampaignId, org_id: OrgId, at: DateTime<Utc>) -> NewsletterCampaign {
        let cta_label = self
            .cta_label
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CTA_LABEL.to_owned());
        NewsletterCampaign {
            id,
            org_id,
            title: self.title,
            body: self.body.unwrap_or_default(),
            cta_url: self.cta_url.unwrap_or_default(),
            cta_label,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub cta_url: Option<String>,
    pub cta_label: Option<String>,
}

impl NewsletterCampaign {
    /// Apply a patch and bump `updated_at`.
    pub fn apply(&mut self, patch: CampaignPatch, at: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(cta_url) = patch.cta_url {
            self.cta_url = cta_url;
        }
        if let Some(cta_label) = patch.cta_label {
            self.cta_label = cta_label;
        }
        self.updated_at = at;
    }
}

/// One block of newsletter content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NewsletterBlock {
    Text {
        id: String,
        content: String,
    },
    Image {
        id: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    BookingButton {
        id: String,
        label: String,
        url: String,
    },
    Yijing {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl NewsletterBlock {
    /// Link carried by the block, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Image { url, .. } | Self::BookingButton { url, .. } => Some(url.as_str()),
            Self::Text { .. } | Self::Yijing { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn org() -> OrgId {
        OrgId::new("org_abc").expect("valid org")
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn drafts_require_a_title(#[case] title: &str) {
        assert_eq!(
            CampaignDraft::new(title).expect_err("blank title"),
            CampaignValidationError::EmptyTitle
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some("  "))]
    fn blank_cta_label_defaults(#[case] label: Option<&str>) {
        let mut draft = CampaignDraft::new("Spring check-up").expect("valid");
        draft.cta_label = label.map(str::to_owned);
        let campaign = draft.into_campaign(CampaignId::generate(), org(), Utc::now());
        assert_eq!(campaign.cta_label, DEFAULT_CTA_LABEL);
        assert_eq!(campaign.body, "");
        assert_eq!(campaign.cta_url, "");
        assert_eq!(campaign.created_at, campaign.updated_at);
    }

    #[rstest]
    fn patches_only_touch_supplied_fields() {
        let created = Utc::now();
        let mut campaign = CampaignDraft::new("Title")
            .expect("valid")
            .into_campaign(CampaignId::generate(), org(), created);
        let later = created + chrono::Duration::seconds(5);
        campaign.apply(
            CampaignPatch {
                cta_url: Some("https://clinic.example/book".to_owned()),
                ..CampaignPatch::default()
            },
            later,
        );
        assert_eq!(campaign.title, "Title");
        assert_eq!(campaign.cta_url, "https://clinic.example/book");
        assert_eq!(campaign.updated_at, later);
        assert_eq!(campaign.created_at, created);
    }

    #[rstest]
    fn blocks_use_type_tags() {
        let block: NewsletterBlock = serde_json::from_value(json!({
            "type": "booking_button",
            "id": "b_1",
            "label": "Book",
            "url": "https://clinic.example/book"
        }))
        .expect("valid block");
        assert_eq!(block.url(), Some("https://clinic.example/book"));
    }
}
