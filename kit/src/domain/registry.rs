//! Mapping from domain error codes to canonical responses.
//!
//! A [`Registry`] is assembled at startup and only read afterwards. It lets a
//! service publish stable `ERR-X000` codes without touching the templates
//! its domain layer raises.

use std::collections::HashMap;

use super::domain_error::{DomainError, ErrorTemplate};
use super::error::Error;
use super::http_error::{GENERIC_ERROR_MESSAGE, HttpError};

/// Code used when nothing matched but validation details were found.
pub const VALIDATION_FALLBACK_CODE: &str = "ERR-V001";

/// Code used when nothing matched at all.
pub const INTERNAL_FALLBACK_CODE: &str = "ERR-I000";

const VALIDATION_FALLBACK_STATUS: u16 = 422;
const INTERNAL_FALLBACK_STATUS: u16 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RegisteredResponse {
    code: String,
    status: u16,
}

/// Read-only table of registered responses, keyed by domain code.
///
/// # Examples
/// ```
/// use service_kit::domain::{Error, ErrorTemplate, Registry};
///
/// const CLAIM_NOT_FOUND: ErrorTemplate = ErrorTemplate::new("CLAIM_NOT_FOUND", "claim {} not found");
///
/// let registry = Registry::new().register(&CLAIM_NOT_FOUND, "ERR-N001", 404);
/// let resolved = registry.resolve(&Error::from(CLAIM_NOT_FOUND.builder().arg(9).build()));
///
/// assert_eq!(resolved.code(), "ERR-N001");
/// assert_eq!(resolved.status_code(), 404);
/// assert_eq!(resolved.message(), "claim 9 not found");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<String, RegisteredResponse>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map errors built from `template` to `code` and `status`.
    ///
    /// An empty `code` is ignored. A zero `status` falls back to 500.
    #[must_use]
    pub fn register(self, template: &ErrorTemplate, code: impl Into<String>, status: u16) -> Self {
        self.register_code(template.code(), code, status)
    }

    /// Like [`Registry::register`] for ad-hoc domain codes.
    #[must_use]
    pub fn register_code(
        mut self,
        domain_code: impl Into<String>,
        code: impl Into<String>,
        status: u16,
    ) -> Self {
        let code = code.into();
        if code.trim().is_empty() {
            return self;
        }
        let status = if status == 0 {
            INTERNAL_FALLBACK_STATUS
        } else {
            status
        };
        self.entries
            .insert(domain_code.into(), RegisteredResponse { code, status });
        self
    }

    /// Number of registered codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `error` to its canonical response.
    ///
    /// HTTP errors pass through. Otherwise domain causes and joined members
    /// are searched depth first and the first registered code wins. A match
    /// inside a domain chain reports the outermost domain error's text; a
    /// match inside a joined error reports the matched error's own text.
    /// Without a match the result is `ERR-V001` (422) when validation
    /// details exist, else `ERR-I000` (500) with a generic message.
    pub fn resolve(&self, error: &Error) -> HttpError {
        if let Error::Http(http) = error {
            return http.clone();
        }

        let details = error.validation_details().unwrap_or_default();

        if let Some((matched, entry)) = self.find(error) {
            let message = match error {
                Error::Domain(outer) => outer.to_string(),
                _ => matched.to_string(),
            };
            let resolved = HttpError::new(entry.status, entry.code.as_str(), message)
                .with_details(details);
            return match matched.cause_message() {
                Some(cause) => resolved.with_cause(cause),
                None => resolved,
            };
        }

        if details.is_empty() {
            HttpError::new(
                INTERNAL_FALLBACK_STATUS,
                INTERNAL_FALLBACK_CODE,
                GENERIC_ERROR_MESSAGE,
            )
            .with_cause(error.to_string())
        } else {
            HttpError::new(
                VALIDATION_FALLBACK_STATUS,
                VALIDATION_FALLBACK_CODE,
                error.to_string(),
            )
            .with_details(details)
        }
    }

    fn find<'e>(&self, error: &'e Error) -> Option<(&'e DomainError, &RegisteredResponse)> {
        match error {
            Error::Domain(domain) => self
                .entries
                .get(domain.code())
                .map(|entry| (domain, entry))
                .or_else(|| domain.cause().and_then(|cause| self.find(cause))),
            Error::Joined(members) => members.iter().find_map(|member| self.find(member)),
            Error::Http(_) | Error::Validation(_) | Error::Unknown(_) => None,
        }
    }
}
