//! Request correlation identifier.
//!
//! The logging middleware scopes a [`RequestId`] around each request future,
//! so handlers and anything they await can read it with
//! [`RequestId::current`] without threading it through arguments.
//!
//! Tokio task-locals do not follow spawned tasks. Wrap spawned work in
//! [`RequestId::scope`] to keep the identifier in view.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use tokio::task_local;
use uuid::Uuid;

/// Longest inbound identifier accepted verbatim.
pub const MAX_REQUEST_ID_LEN: usize = 128;

task_local! {
    static REQUEST_ID: RequestId;
}

/// Reasons an inbound identifier is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RequestIdError {
    /// The value was empty.
    #[error("request id must not be empty")]
    Empty,
    /// The value exceeded [`MAX_REQUEST_ID_LEN`] bytes.
    #[error("request id must be at most {MAX_REQUEST_ID_LEN} bytes")]
    TooLong,
    /// The value contained a byte outside visible ASCII.
    #[error("request id must contain visible ASCII only")]
    InvalidCharacter,
}

/// Per-request correlation identifier.
///
/// Cloning is cheap; the text is shared.
///
/// # Examples
/// ```
/// use service_kit::domain::RequestId;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let id: RequestId = "req-42".parse().expect("valid id");
/// let seen = RequestId::scope(id.clone(), async { RequestId::current() }).await;
/// assert_eq!(seen, Some(id));
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(Arc<str>);

impl RequestId {
    /// Fresh random identifier (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(Arc::from(Uuid::new_v4().to_string()))
    }

    /// Accept `value` when it is a valid identifier, else generate one.
    pub fn from_header_or_generate(value: Option<&str>) -> Self {
        value
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    /// Identifier in scope for the current task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        REQUEST_ID.try_with(Clone::clone).ok()
    }

    /// Run `fut` with `id` in scope.
    pub async fn scope<Fut>(id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        REQUEST_ID.scope(id, fut).await
    }

    /// Identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RequestId {
    type Err = RequestIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(RequestIdError::Empty);
        }
        if s.len() > MAX_REQUEST_ID_LEN {
            return Err(RequestIdError::TooLong);
        }
        if !s.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(RequestIdError::InvalidCharacter);
        }
        Ok(Self(Arc::from(s)))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn generate_produces_uuid() {
        let id = RequestId::generate();
        Uuid::parse_str(id.as_str()).expect("generated id is a UUID");
    }

    #[rstest]
    #[case::empty("", RequestIdError::Empty)]
    #[case::space("a b", RequestIdError::InvalidCharacter)]
    #[case::control("a\tb", RequestIdError::InvalidCharacter)]
    #[case::unicode("naïve", RequestIdError::InvalidCharacter)]
    fn invalid_ids_are_rejected(#[case] raw: &str, #[case] expected: RequestIdError) {
        assert_eq!(raw.parse::<RequestId>(), Err(expected));
    }

    #[rstest]
    fn overlong_ids_are_rejected() {
        let raw = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        assert_eq!(raw.parse::<RequestId>(), Err(RequestIdError::TooLong));
        let max = "a".repeat(MAX_REQUEST_ID_LEN);
        assert!(max.parse::<RequestId>().is_ok());
    }

    #[rstest]
    fn valid_header_is_kept() {
        let id = RequestId::from_header_or_generate(Some(" abc-123 "));
        assert_eq!(id.as_str(), "abc-123");
    }

    #[rstest]
    #[case::missing(None)]
    #[case::invalid(Some("bad id"))]
    fn unusable_header_generates(#[case] header: Option<&str>) {
        let id = RequestId::from_header_or_generate(header);
        Uuid::parse_str(id.as_str()).expect("fallback id is a UUID");
    }

    #[tokio::test]
    async fn current_reflects_scope() {
        let expected = RequestId::generate();
        let observed = RequestId::scope(expected.clone(), async { RequestId::current() }).await;
        assert_eq!(observed, Some(expected));
    }

    #[tokio::test]
    async fn current_is_none_out_of_scope() {
        assert!(RequestId::current().is_none());
    }
}
