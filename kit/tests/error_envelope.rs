//! End-to-end checks of the error envelope through the public API.
//!
//! Each test assembles an app the way a consuming service would: request
//! log with a registry, validated JSON, health probes and the 404 fallback.

use actix_web::http::{StatusCode, header};
use actix_web::test as actix_test;
use actix_web::{App, HttpResponse, web};
use rstest::rstest;
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use service_kit::domain::{ApiResult, ErrorEnvelope, ErrorTemplate, Registry};
use service_kit::inbound::http::{ValidatedJson, health, route_not_found};
use service_kit::logging::{Logger, LoggingSettings};
use service_kit::middleware::{REQUEST_ID_RESPONSE_HEADER, RequestLog};
use service_kit::validation::Validator;

const POLICY_EXPIRED: ErrorTemplate =
    ErrorTemplate::new("POLICY_EXPIRED", "policy {} expired on {}");

#[derive(Debug, Deserialize, Validate)]
struct Renewal {
    #[validate(length(equal = 5))]
    policy: String,
    #[validate(range(min = 1, max = 36))]
    months: u8,
}

async fn renew(body: ValidatedJson<Renewal>) -> ApiResult<HttpResponse> {
    if body.policy == "00000" {
        return Err(POLICY_EXPIRED
            .builder()
            .arg(&body.policy)
            .arg("2024-01-31")
            .build()
            .into());
    }
    Ok(HttpResponse::Accepted().finish())
}

macro_rules! service {
    () => {
        actix_test::init_service(
            App::new()
                .wrap(
                    RequestLog::new(
                        Logger::with_writer(&LoggingSettings::default(), std::io::sink)
                            .expect("logger builds"),
                    )
                    .with_registry(Registry::new().register(&POLICY_EXPIRED, "ERR-B010", 409)),
                )
                .app_data(web::Data::new(Validator::new()))
                .configure(health::configure)
                .route("/renewals", web::post().to(renew))
                .default_service(web::to(route_not_found)),
        )
        .await
    };
}

#[rstest]
#[actix_web::test]
async fn registered_domain_errors_use_the_registered_code() {
    let app = service!();
    let req = actix_test::TestRequest::post()
        .uri("/renewals")
        .set_json(json!({ "policy": "00000", "months": 12 }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert!(res.headers().contains_key(REQUEST_ID_RESPONSE_HEADER));
    let envelope: ErrorEnvelope = actix_test::read_body_json(res).await;
    assert_eq!(envelope.error.code(), "ERR-B010");
    assert_eq!(envelope.error.message(), "policy 00000 expired on 2024-01-31");
    assert_eq!(envelope.error.status_code(), 409);
}

#[rstest]
#[actix_web::test]
async fn validation_failures_are_listed_in_pt_br() {
    let app = service!();
    let req = actix_test::TestRequest::post()
        .uri("/renewals")
        .set_json(json!({ "policy": "123", "months": 12 }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["error"]["code"], "request-validation");
    assert_eq!(body["error"]["status_code"], 400);
    assert_eq!(
        body["error"]["details"],
        json!(["policy deve ter 5 caractere(s)"])
    );
    assert!(body["error"].get("cause").is_none());
}

#[rstest]
#[actix_web::test]
async fn successful_requests_pass_through() {
    let app = service!();
    let req = actix_test::TestRequest::post()
        .uri("/renewals")
        .set_json(json!({ "policy": "12345", "months": 6 }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert!(res.headers().contains_key(REQUEST_ID_RESPONSE_HEADER));
}

#[rstest]
#[case("/live")]
#[case("/ready")]
#[actix_web::test]
async fn probes_answer_without_caching(#[case] path: &str) {
    let app = service!();
    let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri(path).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok()),
        Some("no-store")
    );
}

#[rstest]
#[actix_web::test]
async fn unknown_routes_get_the_envelope() {
    let app = service!();
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/nope").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["error"]["code"], "route-not-found");
    assert_eq!(body["error"]["status_code"], 404);
}
