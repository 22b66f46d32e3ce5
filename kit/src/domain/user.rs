//! Authenticated caller details attached to a request.
//!
//! Authentication layers insert a [`UserContext`] into the request
//! extensions; the request log reads it back once the handler finishes.

/// Placeholder logged for any user field that was not supplied.
pub const UNKNOWN_USER_FIELD: &str = "unknown";

/// Caller identity recorded alongside each request log.
///
/// # Examples
/// ```
/// use service_kit::domain::UserContext;
///
/// let user = UserContext::default().with_email("ana@example.com");
/// assert_eq!(user.email_or_unknown(), "ana@example.com");
/// assert_eq!(user.company_or_unknown(), "unknown");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserContext {
    /// Caller email.
    pub email: Option<String>,
    /// Company the caller acts for.
    pub company: Option<String>,
    /// Category of that company.
    pub company_category: Option<String>,
    /// Granted permissions.
    pub permissions: Vec<String>,
}

impl UserContext {
    /// Set the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the company.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Set the company category.
    #[must_use]
    pub fn with_company_category(mut self, category: impl Into<String>) -> Self {
        self.company_category = Some(category.into());
        self
    }

    /// Replace the permission list.
    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Email, or `"unknown"`.
    pub fn email_or_unknown(&self) -> &str {
        self.email.as_deref().unwrap_or(UNKNOWN_USER_FIELD)
    }

    /// Company, or `"unknown"`.
    pub fn company_or_unknown(&self) -> &str {
        self.company.as_deref().unwrap_or(UNKNOWN_USER_FIELD)
    }

    /// Company category, or `"unknown"`.
    pub fn company_category_or_unknown(&self) -> &str {
        self.company_category
            .as_deref()
            .unwrap_or(UNKNOWN_USER_FIELD)
    }

    /// Comma-separated permissions, or `"unknown"` when none were granted.
    pub fn permissions_or_unknown(&self) -> String {
        if self.permissions.is_empty() {
            UNKNOWN_USER_FIELD.to_owned()
        } else {
            self.permissions.join(",")
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_context_reports_unknown() {
        let user = UserContext::default();
        assert_eq!(user.email_or_unknown(), UNKNOWN_USER_FIELD);
        assert_eq!(user.company_or_unknown(), UNKNOWN_USER_FIELD);
        assert_eq!(user.company_category_or_unknown(), UNKNOWN_USER_FIELD);
        assert_eq!(user.permissions_or_unknown(), UNKNOWN_USER_FIELD);
    }

    #[rstest]
    fn populated_context_reports_values() {
        let user = UserContext::default()
            .with_email("ana@example.com")
            .with_company("acme")
            .with_company_category("hospital")
            .with_permissions(["claims:read", "claims:write"]);
        assert_eq!(user.email_or_unknown(), "ana@example.com");
        assert_eq!(user.company_or_unknown(), "acme");
        assert_eq!(user.company_category_or_unknown(), "hospital");
        assert_eq!(user.permissions_or_unknown(), "claims:read,claims:write");
    }
}
