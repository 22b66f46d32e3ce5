//! JSON body extractor that validates before the handler runs.
//!
//! Malformed bodies become `400 bad-input`; bodies that parse but break a
//! rule become `400 request-validation` with one detail per failure.

use std::ops::Deref;

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::domain::{BAD_INPUT, Error, HttpError, REQUEST_VALIDATION, ValidationErrors};
use crate::validation::Validator;

/// Code for bodies that could not be decoded.
pub const BAD_INPUT_CODE: &str = "bad-input";

/// Code for decoded bodies that failed validation.
pub const REQUEST_VALIDATION_CODE: &str = "request-validation";

const BAD_REQUEST: u16 = 400;

/// Deserialised and validated JSON body.
///
/// The [`Validator`] is taken from app data (`web::Data<Validator>` or a
/// plain `Validator`); a default one is used when neither is registered.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use serde::Deserialize;
/// use service_kit::inbound::http::ValidatedJson;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct NewClaim {
///     #[validate(length(min = 1))]
///     title: String,
/// }
///
/// async fn create(body: ValidatedJson<NewClaim>) -> HttpResponse {
///     HttpResponse::Created().body(body.into_inner().title)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    /// Unwrap the body.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let validator = request_validator(req);
        let fut = web::Json::<T>::from_request(req, payload);
        Box::pin(async move {
            let body = fut.await.map_err(|err| bad_input(&err))?.into_inner();
            validator
                .validate(&body)
                .map_err(|errors| request_validation(&errors))?;
            Ok(Self(body))
        })
    }
}

fn request_validator(req: &HttpRequest) -> Validator {
    req.app_data::<web::Data<Validator>>()
        .map(|data| data.get_ref().clone())
        .or_else(|| req.app_data::<Validator>().cloned())
        .unwrap_or_default()
}

/// 400 `bad-input`, keeping the decoder error as the cause.
pub fn bad_input(cause: &dyn std::fmt::Display) -> Error {
    HttpError::new(BAD_REQUEST, BAD_INPUT_CODE, BAD_INPUT.error().message())
        .with_cause(cause.to_string())
        .into()
}

/// 400 `request-validation` carrying every failure as a detail.
pub fn request_validation(errors: &ValidationErrors) -> Error {
    HttpError::new(
        BAD_REQUEST,
        REQUEST_VALIDATION_CODE,
        REQUEST_VALIDATION.error().message(),
    )
    .with_details(errors.validations().iter().cloned())
    .with_cause(errors.to_string())
    .into()
}
