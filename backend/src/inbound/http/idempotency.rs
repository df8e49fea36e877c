//! `X-Idempotency-Key` header parsing.

use actix_web::http::header::HeaderMap;

use crate::domain::{Error, IDEMPOTENCY_KEY_HEADER, IdempotencyKey, IdempotencyKeyValidationError};

/// Response header set when a cached response is replayed.
pub const IDEMPOTENT_REPLAYED_HEADER: &str = "Idempotent-Replayed";

/// Extract the idempotency key, if the request carries one.
pub fn extract_idempotency_key(headers: &HeaderMap) -> Result<Option<IdempotencyKey>, Error> {
    let Some(value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| map_idempotency_key_error(&IdempotencyKeyValidationError::InvalidKey))?;
    IdempotencyKey::new(raw)
        .map(Some)
        .map_err(|err| map_idempotency_key_error(&err))
}

fn map_idempotency_key_error(err: &IdempotencyKeyValidationError) -> Error {
    Error::invalid_argument(format!("{IDEMPOTENCY_KEY_HEADER} header is invalid: {err}"))
        .with_details(serde_json::json!({
            "field": IDEMPOTENCY_KEY_HEADER,
            "code": "invalid_value",
        }))
}
