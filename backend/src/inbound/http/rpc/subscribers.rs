//! `importSubscribers`.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::ImportSubscribersRequest;
use crate::domain::{Error, ImportOutcome, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_file_hash, parse_org_id};

/// CSV upload; `file_hash` is the client's SHA-256 of `csv_text`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ImportSubscribersBody {
    pub org_id: String,
    /// Absent text is treated as an empty upload.
    #[serde(default)]
    #[schema(example = "email,name\nalice@example.com,Alice\n")]
    pub csv_text: String,
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")]
    pub file_hash: String,
}

impl ImportSubscribersBody {
    fn into_request(self, caller: UserId) -> Result<ImportSubscribersRequest, Error> {
        Ok(ImportSubscribersRequest {
            caller,
            org_id: parse_org_id(self.org_id)?,
            file_hash: parse_file_hash(self.file_hash)?,
            csv_text: self.csv_text,
        })
    }
}

/// Import subscriber emails from CSV text.
#[utoipa::path(
    post,
    path = "/api/v1/rpc/importSubscribers",
    request_body = ImportSubscribersBody,
    responses(
        (status = 200, description = "Import counts", body = ImportOutcome),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Organisation belongs to someone else", body = Error)
    ),
    tags = ["subscribers"],
    operation_id = "importSubscribers"
)]
#[post("/rpc/importSubscribers")]
pub async fn import_subscribers(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ImportSubscribersBody>,
) -> ApiResult<web::Json<ImportOutcome>> {
    let caller = session.require_user_id()?;
    let request = payload.into_inner().into_request(caller)?;
    let outcome = state.imports.import_subscribers(request).await?;
    Ok(web::Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn blank_hash_is_reported_as_missing() {
        let body = ImportSubscribersBody {
            org_id: "org_clinic".to_owned(),
            csv_text: "a@example.com".to_owned(),
            file_hash: " ".to_owned(),
        };
        let err = body
            .into_request(UserId::random())
            .expect_err("blank hash");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert_eq!(
            err.details().and_then(|details| details.get("field")),
            Some(&serde_json::json!("file_hash"))
        );
    }
}
