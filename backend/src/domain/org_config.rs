//! Per-clinic newsletter settings embedded in newsletter footers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Newsletter footer configuration for one clinic.
///
/// Unset configuration reads as empty strings rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrgConfig {
    #[schema(example = "Harmony Family Clinic")]
    pub clinic_name: String,
    #[schema(example = "https://clinic.example/unsubscribe")]
    pub unsubscribe_base_url: String,
}

impl OrgConfig {
    /// Build a full replacement from optional inputs; absent fields become
    /// empty strings.
    ///
    /// # Examples
    /// ```
    /// use clinic_newsletter::domain::OrgConfig;
    ///
    /// let config = OrgConfig::from_parts(Some("Harmony".to_owned()), None);
    /// assert_eq!(config.clinic_name, "Harmony");
    /// assert_eq!(config.unsubscribe_base_url, "");
    /// ```
    pub fn from_parts(clinic_name: Option<String>, unsubscribe_base_url: Option<String>) -> Self {
        Self {
            clinic_name: clinic_name.unwrap_or_default(),
            unsubscribe_base_url: unsubscribe_base_url.unwrap_or_default(),
        }
    }
}
