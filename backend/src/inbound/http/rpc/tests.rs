//! End-to-end tests for the callables against in-memory adapters.

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::test_session_middleware;
use crate::inbound::http::users::{LoginRequest, login};
use crate::inbound::http::validation::json_config;
use crate::test_support::http::{CHEN, FixtureAccount, LIN, MemoryHarness, memory_harness};

fn app(
    harness: &MemoryHarness,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(web::Data::new(harness.state.clone()))
        .app_data(json_config())
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(login)
                .configure(super::configure),
        )
}

async fn sign_in(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    account: FixtureAccount,
) -> actix_web::cookie::Cookie<'static> {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(LoginRequest {
                username: account.username.into(),
                password: account.password.into(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

async fn call(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    cookie: Option<&actix_web::cookie::Cookie<'static>>,
    name: &str,
    body: Value,
) -> ServiceResponse {
    let mut request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/rpc/{name}"))
        .set_json(body);
    if let Some(cookie) = cookie {
        request = request.cookie(cookie.clone());
    }
    actix_test::call_service(app, request.to_request()).await
}

async fn json_of(res: ServiceResponse) -> Value {
    actix_test::read_body_json(res).await
}

async fn own_org(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    cookie: &actix_web::cookie::Cookie<'static>,
) -> String {
    let res = call(app, Some(cookie), "ensureOrgForUser", json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);
    json_of(res).await["org_id"]
        .as_str()
        .expect("org id")
        .to_owned()
}

#[rstest]
#[case("ensureOrgForUser", json!({}))]
#[case("importSubscribers", json!({"org_id": "org_x", "csv_text": "", "file_hash": "h"}))]
#[case("getConversionReport", json!({"org_id": "org_x"}))]
#[case("listNewsletterCampaigns", json!({"org_id": "org_x"}))]
#[case("exportOrgData", json!({"org_id": "org_x"}))]
#[actix_web::test]
async fn callables_require_a_session(#[case] name: &str, #[case] body: Value) {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;

    let res = call(&app, None, name, body).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_of(res).await["code"], "unauthenticated");
}

#[actix_web::test]
async fn ensure_org_is_stable_across_calls() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;

    let first = own_org(&app, &cookie).await;
    let second = own_org(&app, &cookie).await;
    assert_eq!(first, second);
    assert!(first.starts_with("org_"));
}

#[actix_web::test]
async fn import_counts_net_new_rows_on_replay() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;
    let org_id = own_org(&app, &cookie).await;
    let body = json!({
        "org_id": org_id,
        "csv_text": "email\nalice@example.com\nBob@Example.com\nnot-an-email\n",
        "file_hash": "hash-1",
    });

    let first = json_of(call(&app, Some(&cookie), "importSubscribers", body.clone()).await).await;
    assert_eq!(first, json!({"imported": 2, "skipped": 0}));

    let replay = json_of(call(&app, Some(&cookie), "importSubscribers", body).await).await;
    assert_eq!(replay, json!({"imported": 0, "skipped": 2}));
}

#[actix_web::test]
async fn empty_import_reports_a_message() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;
    let org_id = own_org(&app, &cookie).await;

    let res = call(
        &app,
        Some(&cookie),
        "importSubscribers",
        json!({"org_id": org_id, "csv_text": "", "file_hash": "empty"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_of(res).await;
    assert_eq!(body["imported"], 0);
    assert!(body["message"].is_string());
}

#[actix_web::test]
async fn import_without_csv_text_is_a_soft_success() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;
    let org_id = own_org(&app, &cookie).await;

    let res = call(
        &app,
        Some(&cookie),
        "importSubscribers",
        json!({"org_id": org_id, "file_hash": "absent"}),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_of(res).await;
    assert_eq!((body["imported"].clone(), body["skipped"].clone()), (json!(0), json!(0)));
    assert!(body["message"].is_string());
}

#[actix_web::test]
async fn cross_tenant_calls_are_forbidden_and_write_nothing() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let chen = sign_in(&app, CHEN).await;
    let lin = sign_in(&app, LIN).await;
    let chen_org = own_org(&app, &chen).await;

    let res = call(
        &app,
        Some(&lin),
        "importSubscribers",
        json!({"org_id": chen_org, "csv_text": "eve@example.com", "file_hash": "x"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_of(res).await["code"], "permission_denied");

    let export = json_of(
        call(&app, Some(&chen), "exportOrgData", json!({"org_id": chen_org})).await,
    )
    .await;
    assert_eq!(export["data"]["subscribers"], json!([]));
}

#[rstest]
#[case(json!({"org_id": "org_x", "csv_text": "a@example.com"}), "file_hash")]
#[case(json!({"csv_text": "a@example.com", "file_hash": "h"}), "org_id")]
#[actix_web::test]
async fn missing_fields_are_named(#[case] body: Value, #[case] field: &str) {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;

    let res = call(&app, Some(&cookie), "importSubscribers", body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json_of(res).await;
    assert_eq!(body["code"], "invalid_argument");
    assert_eq!(body["details"], json!({"field": field, "code": "missing_field"}));
}

#[actix_web::test]
async fn unknown_fields_are_rejected() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;

    let res = call(
        &app,
        Some(&cookie),
        "getConversionReport",
        json!({"org_id": "org_x", "orgId": "org_x"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_of(res).await["details"]["code"], "invalid_body");
}

#[actix_web::test]
async fn campaign_lifecycle_and_conversion_funnel() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;
    let org_id = own_org(&app, &cookie).await;

    let created = json_of(
        call(
            &app,
            Some(&cookie),
            "createNewsletterCampaign",
            json!({"org_id": org_id, "title": "Spring", "cta_url": "https://clinic.example/book"}),
        )
        .await,
    )
    .await;
    let campaign_id = created["campaign_id"].as_str().expect("campaign id").to_owned();
    assert_eq!(created["tracking_id"], created["campaign_id"]);
    assert_eq!(
        created["tracking_url"],
        format!("https://t.example/t/{campaign_id}")
    );

    let updated = call(
        &app,
        Some(&cookie),
        "updateNewsletterCampaign",
        json!({"org_id": org_id, "campaign_id": campaign_id, "cta_url": "https://clinic.example/new"}),
    )
    .await;
    assert_eq!(json_of(updated).await, json!({"ok": true}));

    for event in ["open", "click", "click", "bogus"] {
        let res = call(
            &app,
            None,
            "recordConversionAndGetTarget",
            json!({"tracking_id": campaign_id, "type": event}),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let target = json_of(res).await;
        assert_eq!(
            target["target_url"],
            format!("https://clinic.example/new?org_id={org_id}")
        );
    }

    let stats = json_of(
        call(
            &app,
            Some(&cookie),
            "getConversionStats",
            json!({"org_id": org_id, "campaign_id": campaign_id}),
        )
        .await,
    )
    .await;
    assert_eq!((stats["O"].clone(), stats["C"].clone(), stats["K"].clone()), (json!(1), json!(1), json!(2)));
    assert_eq!(stats["click_rate"], 100.0);

    let report = json_of(
        call(&app, Some(&cookie), "getConversionReport", json!({"org_id": org_id})).await,
    )
    .await;
    assert_eq!(
        report,
        json!({"sent_total": 1, "open_count": 1, "click_count": 1, "estimated_conversions": 1})
    );

    let listed = json_of(
        call(&app, Some(&cookie), "listNewsletterCampaigns", json!({"org_id": org_id})).await,
    )
    .await;
    assert_eq!(listed["campaigns"][0]["cta_url"], "https://clinic.example/new");
    assert_eq!(listed["campaigns"][0]["cta_label"], "立即預約");
}

#[actix_web::test]
async fn repeated_click_inside_window_is_flagged() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;
    let org_id = own_org(&app, &cookie).await;
    let created = json_of(
        call(
            &app,
            Some(&cookie),
            "createNewsletterCampaign",
            json!({"org_id": org_id, "title": "Spring", "cta_url": "https://clinic.example"}),
        )
        .await,
    )
    .await;
    let body = json!({"tracking_id": created["tracking_id"]});

    let first = json_of(call(&app, None, "recordConversionAndGetTarget", body.clone()).await).await;
    let second =
        json_of(call(&app, None, "recordConversionAndGetTarget", body.clone()).await).await;
    assert_eq!(first["already_logged"], false);
    assert_eq!(second["already_logged"], true);

    harness.clock.advance_seconds(61);
    let later = json_of(call(&app, None, "recordConversionAndGetTarget", body).await).await;
    assert_eq!(later["already_logged"], false);
    assert_eq!(harness.store.conversion_count().await, 2);
}

#[actix_web::test]
async fn unknown_tracking_id_is_not_found() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;

    let res = call(
        &app,
        None,
        "recordConversionAndGetTarget",
        json!({"tracking_id": "nope"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(harness.store.conversion_count().await, 0);
}

#[actix_web::test]
async fn update_of_unknown_campaign_is_not_found() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;
    let org_id = own_org(&app, &cookie).await;

    let res = call(
        &app,
        Some(&cookie),
        "updateNewsletterCampaign",
        json!({"org_id": org_id, "campaign_id": "ghost", "title": "x"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn ensure_tracking_links_is_idempotent() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;
    let org_id = own_org(&app, &cookie).await;
    let body = json!({
        "org_id": org_id,
        "campaign_id": "cmp1",
        "urls": ["https://a.example", " https://b.example ", "", 7, "https://a.example"],
    });

    let first = json_of(call(&app, Some(&cookie), "ensureTrackingLinks", body.clone()).await).await;
    let second = json_of(call(&app, Some(&cookie), "ensureTrackingLinks", body).await).await;
    let mapping = first["mapping"].as_object().expect("mapping");
    assert_eq!(mapping.len(), 2);
    assert!(mapping.contains_key("https://b.example"));
    assert_eq!(first, second);
}

#[actix_web::test]
async fn ensure_tracking_links_requires_urls() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;
    let org_id = own_org(&app, &cookie).await;

    let res = call(
        &app,
        Some(&cookie),
        "ensureTrackingLinks",
        json!({"org_id": org_id, "campaign_id": "cmp1", "urls": []}),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json_of(res).await;
    assert_eq!(body["code"], "invalid_argument");
    assert_eq!(body["details"]["field"], "urls");
}

#[actix_web::test]
async fn org_config_defaults_to_empty_and_overwrites() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;
    let org_id = own_org(&app, &cookie).await;

    let empty = json_of(call(&app, Some(&cookie), "getOrgConfig", json!({"org_id": org_id})).await)
        .await;
    assert_eq!(empty, json!({"clinic_name": "", "unsubscribe_base_url": ""}));

    let saved = call(
        &app,
        Some(&cookie),
        "setOrgConfig",
        json!({"org_id": org_id, "clinic_name": "Harmony"}),
    )
    .await;
    assert_eq!(json_of(saved).await, json!({"ok": true}));

    let config = json_of(call(&app, Some(&cookie), "getOrgConfig", json!({"org_id": org_id})).await)
        .await;
    assert_eq!(config, json!({"clinic_name": "Harmony", "unsubscribe_base_url": ""}));
}

#[actix_web::test]
async fn export_replays_with_the_same_idempotency_key() {
    let harness = memory_harness();
    let app = actix_test::init_service(app(&harness)).await;
    let cookie = sign_in(&app, CHEN).await;
    let org_id = own_org(&app, &cookie).await;

    let export = |key: &'static str| {
        actix_test::TestRequest::post()
            .uri("/api/v1/rpc/exportOrgData")
            .insert_header(("X-Idempotency-Key", key))
            .cookie(cookie.clone())
            .set_json(json!({"org_id": org_id}))
            .to_request()
    };

    let first = actix_test::call_service(&app, export("key-1")).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert!(first.headers().get("Idempotent-Replayed").is_none());
    let first_body = json_of(first).await;
    assert_eq!(first_body["version"], "Genesis_2.6_Export");

    call(
        &app,
        Some(&cookie),
        "importSubscribers",
        json!({"org_id": org_id, "csv_text": "new@example.com", "file_hash": "h2"}),
    )
    .await;

    let replayed = actix_test::call_service(&app, export("key-1")).await;
    assert_eq!(
        replayed
            .headers()
            .get("Idempotent-Replayed")
            .and_then(|value| value.to_str().ok()),
        Some("true")
    );
    assert_eq!(json_of(replayed).await, first_body);

    let fresh = json_of(actix_test::call_service(&app, export("key-2")).await).await;
    assert_eq!(fresh["data"]["subscribers"][0]["email"], "new@example.com");
}
