//! Tests for HTTP error mapping.

use super::*;
use crate::domain::{
    BAD_INPUT, ErrorTemplate, GENERIC_ERROR_MESSAGE, UNKNOWN_ERROR_CODE, ValidationErrors,
};
use actix_web::body::to_bytes;
use actix_web::test as actix_test;
use actix_web::{App, web};
use rstest::{fixture, rstest};
use serde_json::Value;

const USER_NOT_FOUND: ErrorTemplate =
    ErrorTemplate::new("user-not-found", "user with ID {} not found").with_status(404);

#[fixture]
fn validation_error() -> Error {
    ValidationErrors::with_validations(
        "validation failed",
        ["Email é um campo obrigatório"],
    )
    .into()
}

async fn envelope_of(response: HttpResponse) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let json = serde_json::from_slice(&bytes).expect("envelope is JSON");
    (status, json)
}

#[rstest]
fn status_code_follows_coercion(validation_error: Error) {
    let cases = [
        (validation_error, StatusCode::UNPROCESSABLE_ENTITY),
        (USER_NOT_FOUND.builder().arg(7).build().into(), StatusCode::NOT_FOUND),
        (BAD_INPUT.error().into(), StatusCode::BAD_REQUEST),
        (Error::msg("boom"), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
        assert_eq!(ResponseError::status_code(&err), status);
    }
}

#[rstest]
fn out_of_range_status_falls_back_to_500() {
    let err = HttpError::new(1000, "odd", "odd status");
    assert_eq!(
        ResponseError::status_code(&err),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[rstest]
#[actix_web::test]
async fn validation_errors_render_the_envelope(validation_error: Error) {
    let (status, json) = envelope_of(ResponseError::error_response(&validation_error)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["code"], "VALIDATION");
    assert_eq!(json["error"]["message"], "validation failed");
    assert_eq!(json["error"]["details"][0], "Email é um campo obrigatório");
    assert_eq!(json["error"]["status_code"], 422);
}

#[rstest]
#[actix_web::test]
async fn unknown_errors_are_redacted() {
    let err = Error::msg("password=hunter2");
    let (status, json) = envelope_of(ResponseError::error_response(&err)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["code"], UNKNOWN_ERROR_CODE);
    assert_eq!(json["error"]["message"], GENERIC_ERROR_MESSAGE);
    assert!(json["error"].get("details").is_none());
    assert!(!json.to_string().contains("hunter2"));
}

#[rstest]
#[actix_web::test]
async fn request_id_in_scope_is_echoed() {
    let id: RequestId = "req-1".parse().expect("valid id");
    let response = RequestId::scope(id, async {
        ResponseError::error_response(&HttpError::new(409, "dup", "duplicate"))
    })
    .await;
    let header = response
        .headers()
        .get(REQUEST_ID_RESPONSE_HEADER)
        .expect("request id header is set");
    assert_eq!(header, "req-1");
}

#[rstest]
fn framework_client_errors_keep_status() {
    let err = actix_web::error::ErrorPayloadTooLarge("too big");
    let converted = Error::from(err);
    let http = converted.to_http_error();
    assert_eq!(http.status_code(), 413);
    assert_eq!(http.code(), FRAMEWORK_ERROR_CODE);
    assert_eq!(http.message(), "too big");
}

#[rstest]
fn framework_server_errors_are_redacted() {
    let err = actix_web::error::ErrorServiceUnavailable("upstream down");
    let http = Error::from(err).to_http_error();
    assert_eq!(http.status_code(), 503);
    assert_eq!(http.message(), GENERIC_ERROR_MESSAGE);
    assert_eq!(http.cause(), Some("upstream down"));
}

#[rstest]
#[actix_web::test]
async fn unmatched_routes_return_the_envelope() {
    let app = actix_test::init_service(App::new().default_service(web::to(route_not_found))).await;
    let req = actix_test::TestRequest::get().uri("/nowhere").to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let json: Value = actix_test::read_body_json(res).await;
    assert_eq!(json["error"]["code"], ROUTE_NOT_FOUND_CODE);
}
