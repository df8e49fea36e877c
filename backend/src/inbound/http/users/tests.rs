//! Tests for sign-in handlers.

use super::*;
use crate::inbound::http::test_utils::test_session_middleware;
use crate::test_support::http::{CHEN, memory_harness};
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, get, test as actix_test, web};
use rstest::rstest;
use serde_json::Value;

#[get("/whoami")]
async fn whoami(session: SessionContext) -> ApiResult<HttpResponse> {
    let id = session.require_user_id()?;
    Ok(HttpResponse::Ok().body(id.to_string()))
}

fn test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let harness = memory_harness();
    App::new()
        .app_data(web::Data::new(harness.state))
        .app_data(crate::inbound::http::validation::json_config())
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(login)
                .service(logout)
                .service(whoami),
        )
}

fn login_request(username: &str, password: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(LoginRequest {
            username: username.into(),
            password: password.into(),
        })
}

#[rstest]
#[case("   ", "s3cret", "username", "empty_username")]
#[case("dr.chen", "", "password", "empty_password")]
#[actix_web::test]
async fn login_rejects_blank_credentials(
    #[case] username: &str,
    #[case] password: &str,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app()).await;
    let response = actix_test::call_service(&app, login_request(username, password).to_request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["code"], "invalid_argument");
    assert_eq!(value["details"]["field"], field);
    assert_eq!(value["details"]["code"], code);
}

#[actix_web::test]
async fn wrong_password_is_unauthenticated() {
    let app = actix_test::init_service(test_app()).await;
    let response = actix_test::call_service(&app, login_request(CHEN.username, "nope").to_request()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["code"], "unauthenticated");
    assert_eq!(value["message"], "invalid credentials");
}

#[actix_web::test]
async fn login_then_logout_round_trips_the_session() {
    let app = actix_test::init_service(test_app()).await;
    let login_res =
        actix_test::call_service(&app, login_request(CHEN.username, CHEN.password).to_request()).await;
    assert_eq!(login_res.status(), StatusCode::OK);
    let cookie = login_res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();

    let me = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/whoami")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(actix_test::read_body(me).await, CHEN.user_id);

    let logout_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(logout_res.status(), StatusCode::NO_CONTENT);
    let cleared = logout_res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("removal cookie");
    assert_eq!(cleared.value(), "");
}

#[actix_web::test]
async fn unknown_body_fields_are_rejected() {
    let app = actix_test::init_service(test_app()).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({
                "username": CHEN.username,
                "password": CHEN.password,
                "remember": true
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
