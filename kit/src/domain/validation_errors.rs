//! Business-rule validation failures.
//!
//! [`ValidationErrors`] collects human-readable failure strings under a single
//! summary message. Business logic and the [`crate::validation::Validator`]
//! both produce it; the HTTP adapter turns it into a `VALIDATION` response
//! whose `details` carry the collected strings.

use std::fmt;

/// Summary message used when no more specific one is supplied.
pub const DEFAULT_VALIDATION_MESSAGE: &str = "validation failed";

/// Named list of validation failures.
///
/// ## Invariants
/// - [`ValidationErrors::has_validations`] is true exactly when at least one
///   failure string has been recorded.
///
/// # Examples
/// ```
/// use service_kit::domain::ValidationErrors;
///
/// let mut errors = ValidationErrors::new("invalid order");
/// assert!(errors.has_no_validations());
///
/// errors.add("quantity must be positive");
/// assert!(errors.has_validations());
/// assert_eq!(errors.to_string(), "invalid order");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    message: String,
    validations: Vec<String>,
}

impl ValidationErrors {
    /// Create an empty collection with the given summary message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            validations: Vec::new(),
        }
    }

    /// Create a collection pre-populated with failures.
    pub fn with_validations<I, S>(message: impl Into<String>, validations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            message: message.into(),
            validations: validations.into_iter().map(Into::into).collect(),
        }
    }

    /// Append one failure.
    pub fn add(&mut self, validation: impl Into<String>) {
        self.validations.push(validation.into());
    }

    /// Append a failure for a named field, rendered as `"field: message"`.
    pub fn add_field(&mut self, field: &str, message: &str) {
        self.validations.push(format!("{field}: {message}"));
    }

    /// Append several failures, preserving their order.
    pub fn extend<I, S>(&mut self, validations: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validations
            .extend(validations.into_iter().map(Into::into));
    }

    /// Summary message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Recorded failures in insertion order.
    pub fn validations(&self) -> &[String] {
        &self.validations
    }

    /// Consume the collection, returning the failures.
    pub fn into_validations(self) -> Vec<String> {
        self.validations
    }

    /// Whether any failure has been recorded.
    pub fn has_validations(&self) -> bool {
        !self.validations.is_empty()
    }

    /// Whether the collection is still empty.
    pub fn has_no_validations(&self) -> bool {
        self.validations.is_empty()
    }

    /// Return `Err(self)` when failures were recorded, `Ok(())` otherwise.
    ///
    /// # Examples
    /// ```
    /// use service_kit::domain::ValidationErrors;
    ///
    /// assert!(ValidationErrors::new("ok").into_result().is_ok());
    ///
    /// let failing = ValidationErrors::with_validations("bad", ["name is required"]);
    /// assert!(failing.into_result().is_err());
    /// ```
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_validations() {
            Err(self)
        } else {
            Ok(())
        }
    }
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDATION_MESSAGE)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationErrors {}
