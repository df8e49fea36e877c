//! Typed helpers for each callable.

use std::collections::BTreeMap;

use serde_json::json;

use super::{ClientError, IdempotentClient, Replayable, RequestOptions};
use crate::domain::ports::CreatedCampaign;
use crate::domain::{
    ContentHash, ConversionEvent, ConversionReport, ConversionStats, ConversionTarget,
    ImportOutcome, OrgConfig, OrgDataExport, OrgId,
};
use crate::inbound::http::rpc::OkResponse;
use crate::inbound::http::rpc::campaigns::{
    CampaignListResponse, CreateCampaignBody, UpdateCampaignBody,
};
use crate::inbound::http::rpc::orgs::EnsureOrgResponse;
use crate::inbound::http::rpc::tracking::EnsureTrackingLinksResponse;
use crate::inbound::http::users::LoginRequest;

/// Pick `candidate` when it is a usable org id, otherwise `default`.
///
/// Display lookups degrade to the configured clinic instead of failing.
///
/// # Examples
/// ```
/// use clinic_newsletter::client::resolve_org_id;
/// use clinic_newsletter::domain::OrgId;
///
/// let default = OrgId::new("org_default").unwrap();
/// assert_eq!(resolve_org_id(Some("org_abc"), &default).as_ref(), "org_abc");
/// assert_eq!(resolve_org_id(Some("  "), &default), default);
/// assert_eq!(resolve_org_id(None, &default), default);
/// ```
pub fn resolve_org_id(candidate: Option<&str>, default: &OrgId) -> OrgId {
    candidate
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| OrgId::new(raw).ok())
        .unwrap_or_else(|| default.clone())
}

impl IdempotentClient {
    /// Sign in; the session cookie is kept by the client's cookie store.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::POST, "api/v1/login", &RequestOptions::default())?
            .json(&LoginRequest {
                username: username.to_owned(),
                password: password.to_owned(),
            })
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await?;
        Err(super::api_failure(status, &body))
    }

    pub async fn ensure_org_for_user(&self) -> Result<OrgId, ClientError> {
        let response: Replayable<EnsureOrgResponse> = self
            .call("ensureOrgForUser", &json!({}), &RequestOptions::default())
            .await?;
        OrgId::new(response.value.org_id).map_err(|err| ClientError::Decode {
            status: reqwest::StatusCode::OK,
            message: err.to_string(),
        })
    }

    /// Upload CSV text; the file hash is computed here as lowercase hex
    /// SHA-256 of `csv_text`.
    pub async fn import_subscribers(
        &self,
        org_id: &OrgId,
        csv_text: &str,
        options: &RequestOptions,
    ) -> Result<ImportOutcome, ClientError> {
        let file_hash = ContentHash::of_text(csv_text);
        let body = json!({
            "org_id": org_id,
            "csv_text": csv_text,
            "file_hash": file_hash.as_ref(),
        });
        Ok(self.call("importSubscribers", &body, options).await?.value)
    }

    pub async fn ensure_tracking_links(
        &self,
        org_id: &OrgId,
        campaign_id: &str,
        urls: &[String],
    ) -> Result<BTreeMap<String, String>, ClientError> {
        let body = json!({ "org_id": org_id, "campaign_id": campaign_id, "urls": urls });
        let response: Replayable<EnsureTrackingLinksResponse> = self
            .call("ensureTrackingLinks", &body, &RequestOptions::default())
            .await?;
        Ok(response.value.mapping)
    }

    pub async fn record_conversion(
        &self,
        tracking_id: &str,
        event: ConversionEvent,
    ) -> Result<ConversionTarget, ClientError> {
        let body = json!({ "tracking_id": tracking_id, "type": event.as_str() });
        Ok(self
            .call("recordConversionAndGetTarget", &body, &RequestOptions::default())
            .await?
            .value)
    }

    pub async fn conversion_stats(
        &self,
        org_id: &OrgId,
        campaign_id: Option<&str>,
    ) -> Result<ConversionStats, ClientError> {
        let mut body = json!({ "org_id": org_id });
        if let Some(campaign_id) = campaign_id {
            body["campaign_id"] = json!(campaign_id);
        }
        Ok(self
            .call("getConversionStats", &body, &RequestOptions::default())
            .await?
            .value)
    }

    pub async fn conversion_report(&self, org_id: &OrgId) -> Result<ConversionReport, ClientError> {
        Ok(self
            .call(
                "getConversionReport",
                &json!({ "org_id": org_id }),
                &RequestOptions::default(),
            )
            .await?
            .value)
    }

    pub async fn create_campaign(
        &self,
        body: &CreateCampaignBody,
    ) -> Result<CreatedCampaign, ClientError> {
        Ok(self
            .call("createNewsletterCampaign", body, &RequestOptions::default())
            .await?
            .value)
    }

    pub async fn update_campaign(&self, body: &UpdateCampaignBody) -> Result<(), ClientError> {
        let _: Replayable<OkResponse> = self
            .call("updateNewsletterCampaign", body, &RequestOptions::default())
            .await?;
        Ok(())
    }

    pub async fn list_campaigns(
        &self,
        org_id: &OrgId,
    ) -> Result<CampaignListResponse, ClientError> {
        Ok(self
            .call(
                "listNewsletterCampaigns",
                &json!({ "org_id": org_id }),
                &RequestOptions::default(),
            )
            .await?
            .value)
    }

    /// Org settings, falling back to the client's default clinic when
    /// `org_id` is blank or malformed.
    pub async fn org_config(&self, org_id: Option<&str>) -> Result<OrgConfig, ClientError> {
        let org_id = match (org_id, self.default_org_id()) {
            (candidate, Some(default)) => resolve_org_id(candidate, default),
            (Some(raw), None) => OrgId::new(raw.trim()).map_err(|err| ClientError::InvalidPath {
                path: "getOrgConfig".to_owned(),
                message: err.to_string(),
            })?,
            (None, None) => {
                return Err(ClientError::InvalidPath {
                    path: "getOrgConfig".to_owned(),
                    message: "no org id and no default org configured".to_owned(),
                });
            }
        };
        Ok(self
            .call(
                "getOrgConfig",
                &json!({ "org_id": org_id }),
                &RequestOptions::default(),
            )
            .await?
            .value)
    }

    pub async fn set_org_config(
        &self,
        org_id: &OrgId,
        config: &OrgConfig,
    ) -> Result<(), ClientError> {
        let body = json!({
            "org_id": org_id,
            "clinic_name": config.clinic_name,
            "unsubscribe_base_url": config.unsubscribe_base_url,
        });
        let _: Replayable<OkResponse> = self
            .call("setOrgConfig", &body, &RequestOptions::default())
            .await?;
        Ok(())
    }

    /// Export the clinic's data. Pass [`RequestOptions::reusing`] to replay
    /// a previous export on retry.
    pub async fn export_org_data(
        &self,
        org_id: &OrgId,
        options: &RequestOptions,
    ) -> Result<Replayable<OrgDataExport>, ClientError> {
        self.call("exportOrgData", &json!({ "org_id": org_id }), options)
            .await
    }
}
