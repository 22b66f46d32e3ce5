//! Code-tagged domain errors and the templates they are built from.
//!
//! An [`ErrorTemplate`] is a `const` sentinel naming a failure category (code,
//! message format, optional HTTP status). Per-call values are produced through
//! [`DomainErrorBuilder`], which yields an immutable [`DomainError`]; nothing
//! is mutated after `build` returns.

use std::borrow::Cow;
use std::fmt;

use super::error::Error;

/// Malformed or unparsable input.
pub const BAD_INPUT: ErrorTemplate = ErrorTemplate::new(
    "BAD_INPUT",
    "Algo deu errado com os dados informados. Verifique e tente novamente.",
)
.with_status(400);

/// Request payload failed validation.
pub const REQUEST_VALIDATION: ErrorTemplate = ErrorTemplate::new(
    "REQUEST_VALIDATION",
    "Não foi possível concluir requisição. Verifique os dados informados e tente novamente.",
)
.with_status(400);

/// The caller is authenticated but not allowed to perform the action.
pub const ACTION_DENIED: ErrorTemplate = ErrorTemplate::new(
    "ACTION_DENIED",
    "Você não tem permissão para realizar esta ação. Se precisar de acesso, contate o administrador.",
)
.with_status(403);

/// The caller could not be authenticated.
pub const UNAUTHORIZED: ErrorTemplate = ErrorTemplate::new(
    "UNAUTHORIZED",
    "Você não tem autorização para acessar este recurso.",
)
.with_status(401);

/// Predeclared failure category.
///
/// Templates compare by code, so a [`DomainError`] built from one can be
/// recognised later with [`DomainError::is`].
///
/// # Examples
/// ```
/// use service_kit::domain::ErrorTemplate;
///
/// const USER_NOT_FOUND: ErrorTemplate =
///     ErrorTemplate::new("USER_NOT_FOUND", "user with ID {} not found").with_status(404);
///
/// let err = USER_NOT_FOUND.builder().arg(7).build();
/// assert_eq!(err.message(), "user with ID 7 not found");
/// assert!(err.is(&USER_NOT_FOUND));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorTemplate {
    code: &'static str,
    format: &'static str,
    status: Option<u16>,
}

impl ErrorTemplate {
    /// Declare a template with a code and a message format.
    ///
    /// The format uses `{}` positional placeholders; `{{` and `}}` produce
    /// literal braces.
    pub const fn new(code: &'static str, format: &'static str) -> Self {
        Self {
            code,
            format,
            status: None,
        }
    }

    /// Attach the HTTP status used when errors of this kind reach a client.
    pub const fn with_status(self, status: u16) -> Self {
        Self {
            code: self.code,
            format: self.format,
            status: Some(status),
        }
    }

    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Message format.
    pub const fn format(&self) -> &'static str {
        self.format
    }

    /// Associated HTTP status, if any.
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Start building an error of this kind.
    pub fn builder(&self) -> DomainErrorBuilder {
        DomainErrorBuilder {
            code: Cow::Borrowed(self.code),
            format: Cow::Borrowed(self.format),
            args: Vec::new(),
            details: None,
            cause: None,
            status: self.status,
        }
    }

    /// Build an error of this kind without arguments, details or cause.
    pub fn error(&self) -> DomainError {
        self.builder().build()
    }

    /// Build an error of this kind wrapping `cause`.
    pub fn wrap(&self, cause: impl Into<Error>) -> DomainError {
        self.builder().cause(cause).build()
    }
}

/// Builder producing an immutable [`DomainError`].
#[derive(Debug)]
#[must_use]
pub struct DomainErrorBuilder {
    code: Cow<'static, str>,
    format: Cow<'static, str>,
    args: Vec<String>,
    details: Option<Vec<String>>,
    cause: Option<Error>,
    status: Option<u16>,
}

impl DomainErrorBuilder {
    /// Append one format argument.
    pub fn arg(mut self, arg: impl fmt::Display) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Append several format arguments.
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        self.args.extend(args.into_iter().map(|arg| arg.to_string()));
        self
    }

    /// Set the detail list explicitly.
    ///
    /// Explicit details take precedence over those copied from a validation
    /// cause.
    pub fn details<I, S>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details = Some(details.into_iter().map(Into::into).collect());
        self
    }

    /// Wrap an underlying error.
    pub fn cause(mut self, cause: impl Into<Error>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Override the HTTP status inherited from the template.
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Format the message and freeze the error.
    pub fn build(self) -> DomainError {
        let Self {
            code,
            format,
            args,
            details,
            cause,
            status,
        } = self;

        let details = details
            .or_else(|| cause.as_ref().and_then(Error::validation_details))
            .unwrap_or_default();

        DomainError {
            code,
            message: format_template(&format, &args),
            details,
            cause: cause.map(Box::new),
            status,
        }
    }
}

/// Code-tagged error with a formatted message.
///
/// ## Invariants
/// - `Display` renders the formatted message, followed by `": "` and the
///   cause when one is wrapped.
#[derive(Debug, Clone)]
pub struct DomainError {
    code: Cow<'static, str>,
    message: String,
    details: Vec<String>,
    cause: Option<Box<Error>>,
    status: Option<u16>,
}

impl DomainError {
    /// Start building an ad-hoc error that has no predeclared template.
    pub fn builder(
        code: impl Into<Cow<'static, str>>,
        format: impl Into<Cow<'static, str>>,
    ) -> DomainErrorBuilder {
        DomainErrorBuilder {
            code: code.into(),
            format: format.into(),
            args: Vec::new(),
            details: None,
            cause: None,
            status: None,
        }
    }

    /// Stable machine-readable code. May be empty for unclassified errors.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Formatted message, without the cause.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Detail list.
    pub fn details(&self) -> &[String] {
        &self.details
    }

    /// Wrapped error, if any.
    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    /// Rendered cause, or `None` when nothing is wrapped.
    pub fn cause_message(&self) -> Option<String> {
        self.cause.as_ref().map(ToString::to_string)
    }

    /// HTTP status requested by the template or the caller.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Whether this error was built from `template`.
    pub fn is(&self, template: &ErrorTemplate) -> bool {
        self.code == template.code
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {cause}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DomainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Substitute `{}` placeholders with `args` in order.
///
/// Surplus arguments are ignored; placeholders without an argument are kept.
fn format_template(format: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(ch) = chars.next() {
        let next = chars.peek().copied();
        match (ch, next) {
            ('{', Some('{')) | ('}', Some('}')) => {
                chars.next();
                out.push(ch);
            }
            ('{', Some('}')) => {
                chars.next();
                match args.next() {
                    Some(arg) => out.push_str(arg),
                    None => out.push_str("{}"),
                }
            }
            _ => out.push(ch),
        }
    }

    out
}
