//! Portable snapshot of a clinic's data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{NewsletterCampaign, Subscriber};

/// Format marker written into every export.
pub const EXPORT_FORMAT_VERSION: &str = "Genesis_2.6_Export";

/// Campaign as it appears in an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExportedCampaign {
    #[schema(example = "Xc9kq2Lr0aBvT5yUe1Zs")]
    pub id: String,
    pub title: String,
    pub body: String,
    pub cta_url: String,
    pub cta_label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NewsletterCampaign> for ExportedCampaign {
    fn from(value: NewsletterCampaign) -> Self {
        Self {
            id: value.id.into(),
            title: value.title,
            body: value.body,
            cta_url: value.cta_url,
            cta_label: value.cta_label,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Export payload body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrgDataExportData {
    pub subscribers: Vec<Subscriber>,
    pub campaigns: Vec<ExportedCampaign>,
}

/// Versioned export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrgDataExport {
    #[schema(example = "Genesis_2.6_Export")]
    pub version: String,
    pub data: OrgDataExportData,
}

impl OrgDataExport {
    /// Assemble an export in the current format.
    pub fn new(subscribers: Vec<Subscriber>, campaigns: Vec<NewsletterCampaign>) -> Self {
        Self {
            version: EXPORT_FORMAT_VERSION.to_owned(),
            data: OrgDataExportData {
                subscribers,
                campaigns: campaigns.into_iter().map(ExportedCampaign::from).collect(),
            },
        }
    }
}
