//! Client-facing error payload.
//!
//! [`HttpError`] is what a client finally sees: status, stable code (slug),
//! message and optional details. It stays free of actix types; the inbound
//! HTTP adapter writes it into responses. Coercion from [`Error`] lives here
//! so every boundary classifies failures the same way.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::domain_error::DomainError;
use super::error::Error;
use super::validation_errors::ValidationErrors;

/// Code used when nothing more specific is known.
pub const UNKNOWN_ERROR_CODE: &str = "unknown-error";

/// Code used for validation failures.
pub const VALIDATION_CODE: &str = "VALIDATION";

/// Public message for failures whose text must not reach clients.
pub const GENERIC_ERROR_MESSAGE: &str = "Algo deu errado. Tente novamente mais tarde.";

/// Status used when none is supplied.
pub const DEFAULT_STATUS: u16 = 500;

const BAD_REQUEST: u16 = 400;
const UNAUTHORIZED: u16 = 401;
const FORBIDDEN: u16 = 403;
const NOT_FOUND: u16 = 404;
const CONFLICT: u16 = 409;
const UNPROCESSABLE_ENTITY: u16 = 422;

/// Coarse category derived from `ERR-X000`-style codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// `ERR-V…`
    Validation,
    /// `ERR-B…`
    Business,
    /// `ERR-N…`
    NotFound,
    /// `ERR-R…`
    BadRequest,
    /// `ERR-P…`
    Permission,
    /// `ERR-A…`
    Authentication,
    /// `ERR-I…`
    Internal,
    /// `ERR-E…`
    External,
    /// Anything else.
    Unknown,
}

impl ErrorCategory {
    /// Derive the category from the fifth character of `code`.
    ///
    /// # Examples
    /// ```
    /// use service_kit::domain::ErrorCategory;
    ///
    /// assert_eq!(ErrorCategory::from_code("ERR-V001"), ErrorCategory::Validation);
    /// assert_eq!(ErrorCategory::from_code("ERR"), ErrorCategory::Unknown);
    /// ```
    pub fn from_code(code: &str) -> Self {
        match code.as_bytes().get(4) {
            Some(b'V') => Self::Validation,
            Some(b'B') => Self::Business,
            Some(b'N') => Self::NotFound,
            Some(b'R') => Self::BadRequest,
            Some(b'P') => Self::Permission,
            Some(b'A') => Self::Authentication,
            Some(b'I') => Self::Internal,
            Some(b'E') => Self::External,
            _ => Self::Unknown,
        }
    }

    /// Lowercase label used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Business => "business",
            Self::NotFound => "notfound",
            Self::BadRequest => "badrequest",
            Self::Permission => "permission",
            Self::Authentication => "authentication",
            Self::Internal => "internal",
            Self::External => "external",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error payload written to clients.
///
/// ## Invariants
/// - `status_code` is never zero; it defaults to 500.
/// - `code` is never empty; it defaults to `unknown-error`.
/// - `cause` is for operators: it is logged but never serialised.
///
/// # Examples
/// ```
/// use service_kit::domain::HttpError;
///
/// let err = HttpError::new(404, "user-not-found", "user with ID 7 not found");
/// let json = serde_json::to_value(&err).expect("serialises");
/// assert_eq!(json["status_code"], 404);
/// assert!(json.get("details").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "HttpErrorDto", into = "HttpErrorDto")]
pub struct HttpError {
    #[schema(example = "user-not-found")]
    code: String,
    #[schema(example = "user with ID 7 not found")]
    message: String,
    details: Vec<String>,
    #[schema(example = 404)]
    status_code: u16,
    #[serde(skip)]
    cause: Option<String>,
}

/// Validation failures raised when decoding an [`HttpError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpErrorValidationError {
    /// The decoded message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
}

impl HttpError {
    /// Create an error, applying the status and code defaults.
    pub fn new(status_code: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            code: if code.trim().is_empty() {
                UNKNOWN_ERROR_CODE.to_owned()
            } else {
                code
            },
            message: message.into(),
            details: Vec::new(),
            status_code: if status_code == 0 {
                DEFAULT_STATUS
            } else {
                status_code
            },
            cause: None,
        }
    }

    /// Create an error whose message is the rendered `error`.
    ///
    /// Validation failures found in the chain become `details`.
    pub fn from_error(status_code: u16, code: impl Into<String>, error: impl Into<Error>) -> Self {
        let error = error.into();
        let details = error.validation_details().unwrap_or_default();
        Self::new(status_code, code, error.to_string()).with_details(details)
    }

    /// 500 with the generic public message; `cause` keeps the raw text.
    pub fn internal_server_error(cause: impl fmt::Display) -> Self {
        let cause = cause.to_string();
        let error = Self::new(DEFAULT_STATUS, UNKNOWN_ERROR_CODE, GENERIC_ERROR_MESSAGE);
        if cause.trim().is_empty() {
            error
        } else {
            error.with_cause(cause)
        }
    }

    /// 401 with code `unauthorized`.
    pub fn unauthorized(error: impl Into<Error>) -> Self {
        Self::from_error(UNAUTHORIZED, "unauthorized", error)
    }

    /// 403 with the given code.
    pub fn forbidden(code: impl Into<String>, error: impl Into<Error>) -> Self {
        Self::from_error(FORBIDDEN, code, error)
    }

    /// 400 with the given code.
    pub fn bad_request(code: impl Into<String>, error: impl Into<Error>) -> Self {
        Self::from_error(BAD_REQUEST, code, error)
    }

    /// 422 with the given code.
    pub fn unprocessable_entity(code: impl Into<String>, error: impl Into<Error>) -> Self {
        Self::from_error(UNPROCESSABLE_ENTITY, code, error)
    }

    /// 409 with the given code.
    pub fn conflict(code: impl Into<String>, error: impl Into<Error>) -> Self {
        Self::from_error(CONFLICT, code, error)
    }

    /// 404 with the given code.
    pub fn not_found(code: impl Into<String>, error: impl Into<Error>) -> Self {
        Self::from_error(NOT_FOUND, code, error)
    }

    /// 422 `VALIDATION` carrying every failure as a detail.
    pub fn validation(errors: &ValidationErrors) -> Self {
        Self::new(UNPROCESSABLE_ENTITY, VALIDATION_CODE, errors.message())
            .with_details(errors.validations().iter().cloned())
    }

    /// Replace the status. Zero falls back to 500.
    #[must_use]
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = if status_code == 0 {
            DEFAULT_STATUS
        } else {
            status_code
        };
        self
    }

    /// Replace the detail list.
    #[must_use]
    pub fn with_details<I, S>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details = details.into_iter().map(Into::into).collect();
        self
    }

    /// Record operator-facing cause text.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Stable machine-readable code (slug).
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Detail list; empty when the source carried no field-level data.
    pub fn details(&self) -> &[String] {
        &self.details
    }

    /// HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Operator-facing cause, never serialised.
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// Category derived from the code.
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(&self.code)
    }

    /// Whether this is the generic unknown-error fallback.
    pub fn is_unknown(&self) -> bool {
        self.code == UNKNOWN_ERROR_CODE
    }

    fn from_domain(error: &DomainError) -> Self {
        let message = if error.message().trim().is_empty() {
            GENERIC_ERROR_MESSAGE
        } else {
            error.message()
        };
        let http = Self::new(
            error.status().unwrap_or(DEFAULT_STATUS),
            error.code(),
            message,
        )
        .with_details(error.details().iter().cloned());

        match error.cause_message() {
            Some(cause) => http.with_cause(cause),
            None => http,
        }
    }

    fn classify_domain(error: &Error, domain: &DomainError) -> Self {
        let has_client_status = domain.status().is_some_and(|status| (400..500).contains(&status));
        let wrapped_validation = error.validation_details().filter(|_| !has_client_status);

        match (domain.code().trim().is_empty(), wrapped_validation) {
            (true, Some(details)) => {
                let message = if domain.message().trim().is_empty() {
                    GENERIC_ERROR_MESSAGE
                } else {
                    domain.message()
                };
                Self::new(UNPROCESSABLE_ENTITY, VALIDATION_CODE, message)
                    .with_details(details)
                    .with_cause(domain.to_string())
            }
            (true, None) => Self::internal_server_error(domain),
            (false, Some(_)) => Self::from_domain(domain).with_status(UNPROCESSABLE_ENTITY),
            (false, None) => Self::from_domain(domain),
        }
    }

    fn from_joined(error: &Error, members: &[Error]) -> Self {
        if let Some(found) = members
            .iter()
            .map(Self::from)
            .find(|candidate| !candidate.is_unknown())
        {
            return found;
        }

        match error.validation_details() {
            Some(details) => Self::new(UNPROCESSABLE_ENTITY, VALIDATION_CODE, GENERIC_ERROR_MESSAGE)
                .with_details(details)
                .with_cause(error.to_string()),
            None => Self::internal_server_error(error),
        }
    }
}

impl From<&Error> for HttpError {
    /// Classify a failure for clients.
    ///
    /// Existing HTTP errors pass through. Validation failures become 422
    /// `VALIDATION`, also when a domain error wraps them without a client
    /// status of its own. Domain errors otherwise keep their code, message and
    /// status, unless the code is empty, in which case they are treated like
    /// unknown errors. Unknown errors become a 500 with a generic message.
    fn from(error: &Error) -> Self {
        match error {
            Error::Http(http) => http.clone(),
            Error::Validation(errors) => Self::validation(errors),
            Error::Domain(domain) => Self::classify_domain(error, domain),
            Error::Joined(members) => Self::from_joined(error, members),
            Error::Unknown(inner) => Self::internal_server_error(inner),
        }
    }
}

impl From<Error> for HttpError {
    fn from(error: Error) -> Self {
        Self::from(&error)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.details.is_empty() {
            write!(f, " ({})", self.details.join(","))?;
        }
        Ok(())
    }
}

impl std::error::Error for HttpError {}

/// JSON envelope wrapping every error response.
///
/// ```json
/// { "error": { "code": "VALIDATION", "message": "validation failed",
///              "details": ["Email é um campo obrigatório"], "status_code": 422 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// The error payload.
    pub error: HttpError,
}

impl From<HttpError> for ErrorEnvelope {
    fn from(error: HttpError) -> Self {
        Self { error }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HttpErrorDto {
    #[serde(default)]
    code: String,
    message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
    #[serde(default)]
    status_code: u16,
}

impl From<HttpError> for HttpErrorDto {
    fn from(value: HttpError) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
            status_code: value.status_code,
        }
    }
}

impl TryFrom<HttpErrorDto> for HttpError {
    type Error = HttpErrorValidationError;

    fn try_from(value: HttpErrorDto) -> Result<Self, Self::Error> {
        let HttpErrorDto {
            code,
            message,
            details,
            status_code,
        } = value;

        if message.trim().is_empty() {
            return Err(HttpErrorValidationError::EmptyMessage);
        }
        Ok(Self::new(status_code, code, message).with_details(details))
    }
}
