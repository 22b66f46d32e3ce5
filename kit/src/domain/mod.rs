//! Error model and request-scoped primitives.
//!
//! Purpose: define the failure kinds a service can raise and the
//! client-facing shape they are classified into. Nothing here depends on
//! actix; the inbound HTTP adapter and the middleware build on these types.
//!
//! Public surface:
//! - Error (alias to `error::Error`): closed sum of every failure kind.
//! - HttpError (alias to `http_error::HttpError`): client-facing payload.
//! - DomainError / ErrorTemplate: code-tagged errors and their sentinels.
//! - ValidationErrors: business-rule validation failures.
//! - Registry: optional domain-code to response-code mapping.
//! - RequestId / UserContext: request-scoped metadata for logs.

pub mod domain_error;
pub mod error;
pub mod http_error;
pub mod registry;
pub mod request_id;
pub mod user;
pub mod validation_errors;

pub use self::domain_error::{
    ACTION_DENIED, BAD_INPUT, DomainError, DomainErrorBuilder, ErrorTemplate, REQUEST_VALIDATION,
    UNAUTHORIZED,
};
pub use self::error::Error;
pub use self::http_error::{
    DEFAULT_STATUS, ErrorCategory, ErrorEnvelope, GENERIC_ERROR_MESSAGE, HttpError,
    HttpErrorValidationError, UNKNOWN_ERROR_CODE, VALIDATION_CODE,
};
pub use self::registry::{INTERNAL_FALLBACK_CODE, Registry, VALIDATION_FALLBACK_CODE};
pub use self::request_id::{MAX_REQUEST_ID_LEN, RequestId, RequestIdError};
pub use self::user::{UNKNOWN_USER_FIELD, UserContext};
pub use self::validation_errors::{DEFAULT_VALIDATION_MESSAGE, ValidationErrors};

/// Result alias for handlers and services.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use service_kit::domain::{ApiResult, UNAUTHORIZED};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(UNAUTHORIZED.error().into())
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
