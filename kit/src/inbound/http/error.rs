//! HTTP adapter for the error model.
//!
//! Purpose: keep the domain error types actix-free while letting handlers
//! return them directly. Every error response carries the same JSON
//! envelope, `{"error": {...}}`, and the request id when one is in scope.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::debug;

use crate::domain::{Error, ErrorEnvelope, HttpError, RequestId};
use crate::middleware::REQUEST_ID_RESPONSE_HEADER;

/// Convenient result alias for HTTP handlers.
pub use crate::domain::ApiResult;

/// Code given to errors raised by actix itself (payload limits, extractors).
pub const FRAMEWORK_ERROR_CODE: &str = "http-error";

/// Code returned when no route matches.
pub const ROUTE_NOT_FOUND_CODE: &str = "route-not-found";

fn status_for(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn envelope_response(error: &HttpError) -> HttpResponse {
    let mut builder = HttpResponse::build(status_for(error.status_code()));
    if let Some(id) = RequestId::current() {
        builder.insert_header((REQUEST_ID_RESPONSE_HEADER, id.as_str()));
    }
    builder.json(ErrorEnvelope::from(error.clone()))
}

impl ResponseError for HttpError {
    fn status_code(&self) -> StatusCode {
        status_for(HttpError::status_code(self))
    }

    fn error_response(&self) -> HttpResponse {
        envelope_response(self)
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.to_http_error().status_code())
    }

    fn error_response(&self) -> HttpResponse {
        envelope_response(&self.to_http_error())
    }
}

/// Client-facing shape of an error raised by actix itself.
///
/// Client errors keep the framework's text; server errors are redacted.
pub fn framework_http_error(err: &actix_web::Error) -> HttpError {
    let status = err.as_response_error().status_code();
    if status.is_server_error() {
        HttpError::internal_server_error(err).with_status(status.as_u16())
    } else {
        HttpError::new(status.as_u16(), FRAMEWORK_ERROR_CODE, err.to_string())
    }
}

/// Client-facing shape of any error attached to a response.
///
/// Service errors are coerced, HTTP errors pass through and everything else
/// is treated as a framework error.
pub fn classify(err: &actix_web::Error) -> HttpError {
    if let Some(error) = err.as_error::<Error>() {
        error.to_http_error()
    } else if let Some(http) = err.as_error::<HttpError>() {
        http.clone()
    } else {
        framework_http_error(err)
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        debug!(error = %err, "framework error promoted to service error");
        Error::Http(framework_http_error(&err))
    }
}

/// Default service answering unmatched routes with a 404 envelope.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use service_kit::inbound::http::error::route_not_found;
///
/// let app = App::new().default_service(web::to(route_not_found));
/// # let _ = app;
/// ```
pub async fn route_not_found() -> ApiResult<HttpResponse> {
    Err(HttpError::new(
        StatusCode::NOT_FOUND.as_u16(),
        ROUTE_NOT_FOUND_CODE,
        "Recurso não encontrado.",
    )
    .into())
}

#[cfg(test)]
mod tests;
