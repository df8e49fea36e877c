//! Campaign authoring callables.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{OkResponse, OrgScopedRequest};
use crate::domain::ports::{CreateCampaignRequest, CreatedCampaign, UpdateCampaignRequest};
use crate::domain::{
    CampaignDraft, CampaignPatch, CampaignValidationError, Error, ExportedCampaign, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{TITLE, parse_campaign_id, parse_org_id};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCampaignBody {
    pub org_id: String,
    #[schema(example = "Spring check-up reminder")]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    #[schema(example = "https://clinic.example/book")]
    pub cta_url: Option<String>,
    #[serde(default)]
    pub cta_label: Option<String>,
}

impl CreateCampaignBody {
    fn into_request(self, caller: UserId) -> Result<CreateCampaignRequest, Error> {
        let org_id = parse_org_id(self.org_id)?;
        let mut draft = CampaignDraft::new(self.title).map_err(|err| match err {
            CampaignValidationError::EmptyTitle => Error::missing_field(TITLE.as_str()),
        })?;
        draft.body = self.body;
        draft.cta_url = self.cta_url;
        draft.cta_label = self.cta_label;
        Ok(CreateCampaignRequest {
            caller,
            org_id,
            draft,
        })
    }
}

/// Partial campaign edit; omitted fields stay unchanged.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCampaignBody {
    pub org_id: String,
    pub campaign_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub cta_url: Option<String>,
    #[serde(default)]
    pub cta_label: Option<String>,
}

impl UpdateCampaignBody {
    fn into_request(self, caller: UserId) -> Result<UpdateCampaignRequest, Error> {
        Ok(UpdateCampaignRequest {
            caller,
            org_id: parse_org_id(self.org_id)?,
            campaign_id: parse_campaign_id(self.campaign_id)?,
            patch: CampaignPatch {
                title: self.title,
                body: self.body,
                cta_url: self.cta_url,
                cta_label: self.cta_label,
            },
        })
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CampaignListResponse {
    /// Newest first.
    pub campaigns: Vec<ExportedCampaign>,
}

/// Author a campaign and its call-to-action tracking link.
#[utoipa::path(
    post,
    path = "/api/v1/rpc/createNewsletterCampaign",
    request_body = CreateCampaignBody,
    responses(
        (status = 200, description = "Campaign created", body = CreatedCampaign),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Organisation belongs to someone else", body = Error)
    ),
    tags = ["campaigns"],
    operation_id = "createNewsletterCampaign"
)]
#[post("/rpc/createNewsletterCampaign")]
pub async fn create_newsletter_campaign(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCampaignBody>,
) -> ApiResult<web::Json<CreatedCampaign>> {
    let caller = session.require_user_id()?;
    let request = payload.into_inner().into_request(caller)?;
    let created = state.campaigns.create_campaign(request).await?;
    Ok(web::Json(created))
}

/// Edit a campaign; a new CTA URL also retargets its tracking link.
#[utoipa::path(
    post,
    path = "/api/v1/rpc/updateNewsletterCampaign",
    request_body = UpdateCampaignBody,
    responses(
        (status = 200, description = "Campaign updated", body = OkResponse),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Organisation belongs to someone else", body = Error),
        (status = 404, description = "Unknown campaign", body = Error)
    ),
    tags = ["campaigns"],
    operation_id = "updateNewsletterCampaign"
)]
#[post("/rpc/updateNewsletterCampaign")]
pub async fn update_newsletter_campaign(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateCampaignBody>,
) -> ApiResult<web::Json<OkResponse>> {
    let caller = session.require_user_id()?;
    let request = payload.into_inner().into_request(caller)?;
    state.campaigns.update_campaign(request).await?;
    Ok(OkResponse::ok())
}

#[utoipa::path(
    post,
    path = "/api/v1/rpc/listNewsletterCampaigns",
    request_body = OrgScopedRequest,
    responses(
        (status = 200, description = "Campaigns, newest first", body = CampaignListResponse),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Organisation belongs to someone else", body = Error)
    ),
    tags = ["campaigns"],
    operation_id = "listNewsletterCampaigns"
)]
#[post("/rpc/listNewsletterCampaigns")]
pub async fn list_newsletter_campaigns(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OrgScopedRequest>,
) -> ApiResult<web::Json<CampaignListResponse>> {
    let caller = session.require_user_id()?;
    let org_id = parse_org_id(payload.into_inner().org_id)?;
    let campaigns = state.campaigns.list_campaigns(&caller, &org_id).await?;
    Ok(web::Json(CampaignListResponse {
        campaigns: campaigns.into_iter().map(ExportedCampaign::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DEFAULT_CTA_LABEL, ErrorCode, OrgId};
    use crate::test_support::clock::fixture_timestamp;
    use rstest::rstest;

    fn create_body(title: &str) -> CreateCampaignBody {
        CreateCampaignBody {
            org_id: "org_clinic".to_owned(),
            title: title.to_owned(),
            body: None,
            cta_url: Some("https://clinic.example/book".to_owned()),
            cta_label: None,
        }
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_titles_are_missing(#[case] title: &str) {
        let err = create_body(title)
            .into_request(UserId::random())
            .expect_err("blank title");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert_eq!(
            err.details().and_then(|details| details.get("code")),
            Some(&serde_json::json!("missing_field"))
        );
    }

    #[test]
    fn absent_label_falls_back_to_default() {
        let request = create_body("Spring")
            .into_request(UserId::random())
            .expect("valid body");
        let campaign = request.draft.into_campaign(
            crate::domain::CampaignId::new("cmp1").expect("valid id"),
            OrgId::new("org_clinic").expect("valid org"),
            fixture_timestamp(),
        );
        assert_eq!(campaign.cta_label, DEFAULT_CTA_LABEL);
        assert_eq!(campaign.cta_url, "https://clinic.example/book");
    }
}
