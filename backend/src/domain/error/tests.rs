//! Tests for error construction, trace propagation and serialisation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_argument("bad"), ErrorCode::InvalidArgument)]
#[case(Error::unauthenticated("login required"), ErrorCode::Unauthenticated)]
#[case(Error::permission_denied("other clinic"), ErrorCode::PermissionDenied)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::service_unavailable("db down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidArgument, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values() {
    let result = Error::invalid_argument("bad").try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn missing_field_reports_field_and_code() {
    let error = Error::missing_field("org_id");
    assert_eq!(error.code(), ErrorCode::InvalidArgument);
    assert_eq!(
        error.details(),
        Some(&json!({"field": "org_id", "code": "missing_field"}))
    );
}

#[rstest]
fn trace_id_is_absent_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn trace_id_is_captured_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id.parse().expect("valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;
    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
#[tokio::test]
async fn deserialising_ignores_the_ambient_trace(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id.parse().expect("valid UUID");
    let payload = json!({"code": "not_found", "message": "missing"});
    let error = TraceId::scope(trace_id, async move {
        serde_json::from_value::<Error>(payload).expect("valid payload")
    })
    .await;
    assert!(error.trace_id().is_none());
}

#[rstest]
fn serialises_with_snake_case_codes_and_camel_case_fields(expected_trace_id: String) {
    let error = Error::permission_denied("other clinic").with_trace_id(expected_trace_id.clone());
    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "code": "permission_denied",
            "message": "other clinic",
            "traceId": expected_trace_id,
        })
    );
}

#[rstest]
fn rejects_blank_messages_on_deserialise() {
    let payload = json!({"code": "internal_error", "message": "  "});
    assert!(serde_json::from_value::<Error>(payload).is_err());
}
