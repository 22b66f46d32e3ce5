//! The error type returned by handlers and services.
//!
//! [`Error`] is a closed set of failure kinds. Everything that reaches the
//! HTTP boundary is one of these variants, and classification into a client
//! response is an exhaustive `match` (see [`crate::domain::HttpError`]).

use std::fmt;
use std::sync::Arc;

use super::domain_error::{DomainError, ErrorTemplate};
use super::http_error::HttpError;
use super::validation_errors::ValidationErrors;

/// Any failure a handler can return.
///
/// # Examples
/// ```
/// use service_kit::domain::{Error, ValidationErrors, UNAUTHORIZED};
///
/// let validation: Error = ValidationErrors::with_validations("bad", ["name"]).into();
/// assert_eq!(validation.validation_details(), Some(vec!["name".to_owned()]));
///
/// let domain: Error = UNAUTHORIZED.error().into();
/// assert!(domain.validation_details().is_none());
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A response already shaped for HTTP clients.
    #[error(transparent)]
    Http(#[from] HttpError),
    /// Business-rule validation failures.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    /// A known, code-tagged domain failure.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Several errors reported together.
    #[error("{}", display_joined(.0))]
    Joined(Vec<Error>),
    /// Anything else. Its text is for operators only.
    #[error("{0}")]
    Unknown(Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary error as [`Error::Unknown`].
    pub fn unknown(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unknown(Arc::new(error))
    }

    /// Build an [`Error::Unknown`] from a plain message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::Unknown(Arc::new(MessageError(message.to_string())))
    }

    /// Join several errors. Returns `None` when `errors` is empty and the sole
    /// error when only one is given.
    pub fn join(errors: impl IntoIterator<Item = Self>) -> Option<Self> {
        let mut errors: Vec<Self> = errors.into_iter().collect();
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Joined(errors)),
        }
    }

    /// Validation failures carried anywhere in the chain.
    ///
    /// Domain causes are followed and joined members are searched in order;
    /// the first [`ValidationErrors`] found wins.
    pub fn validation_details(&self) -> Option<Vec<String>> {
        match self {
            Self::Validation(errors) => Some(errors.validations().to_vec()),
            Self::Domain(error) => error.cause().and_then(Self::validation_details),
            Self::Joined(errors) => errors.iter().find_map(Self::validation_details),
            Self::Http(_) | Self::Unknown(_) => None,
        }
    }

    /// Coerce into the client-facing representation.
    pub fn to_http_error(&self) -> HttpError {
        HttpError::from(self)
    }
}

impl From<ErrorTemplate> for Error {
    fn from(template: ErrorTemplate) -> Self {
        Self::Domain(template.error())
    }
}

fn display_joined(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Message-only error backing [`Error::msg`].
#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MessageError {}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{BAD_INPUT, REQUEST_VALIDATION};
    use rstest::rstest;

    #[rstest]
    fn join_of_nothing_is_none() {
        assert!(Error::join(Vec::new()).is_none());
    }

    #[rstest]
    fn join_of_one_unwraps() {
        let joined = Error::join([Error::msg("only")]).expect("one error");
        assert!(matches!(joined, Error::Unknown(_)));
    }

    #[rstest]
    fn joined_display_lists_members() {
        let joined = Error::join([Error::msg("first"), Error::msg("second")]).expect("two errors");
        assert_eq!(joined.to_string(), "first\nsecond");
    }

    #[rstest]
    fn validation_details_follow_domain_causes() {
        let validation = ValidationErrors::with_validations("bad", ["email"]);
        let outer = BAD_INPUT.wrap(REQUEST_VALIDATION.wrap(validation));
        let error = Error::from(outer);
        assert_eq!(error.validation_details(), Some(vec!["email".to_owned()]));
    }

    #[rstest]
    fn validation_details_search_joined_members() {
        let joined = Error::Joined(vec![
            Error::msg("boom"),
            ValidationErrors::with_validations("bad", ["name"]).into(),
        ]);
        assert_eq!(joined.validation_details(), Some(vec!["name".to_owned()]));
    }

    #[rstest]
    fn unknown_errors_carry_no_details() {
        assert!(Error::msg("boom").validation_details().is_none());
    }
}
