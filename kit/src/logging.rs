//! Logging configuration loaded via OrthoConfig, and the injected [`Logger`].
//!
//! The library never installs a global subscriber. A [`Logger`] owns a
//! [`tracing::Dispatch`]; the request log middleware runs each request under
//! it, so handler events land in the same sink as the request record.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_SERVICE_NAME: &str = env!("CARGO_PKG_NAME");

/// Errors raised while building a [`Logger`].
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The level or filter directive could not be parsed.
    #[error("invalid log filter `{directive}`: {source}")]
    InvalidFilter {
        /// Directive as configured.
        directive: String,
        /// Parser failure.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    /// The output format is not one of `json` or `pretty`.
    #[error("unknown log format `{0}`; expected `json` or `pretty`")]
    UnknownFormat(String),
}

/// Output encoding for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable multi-field lines.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            _ => Err(LoggingError::UnknownFormat(s.to_owned())),
        }
    }
}

/// Logging and request-log settings.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SERVICE_KIT_LOG")]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `service_kit=debug,warn`.
    pub level: Option<String>,
    /// Output format: `json` (default) or `pretty`.
    pub format: Option<String>,
    /// Service name recorded on every request span.
    pub service_name: Option<String>,
    /// Service version recorded on every request span.
    pub service_version: Option<String>,
    /// Log request headers (sensitive ones redacted).
    #[ortho_config(default = false)]
    pub include_headers: bool,
    /// Log the `User-Agent` header.
    #[ortho_config(default = false)]
    pub include_user_agent: bool,
}

impl LoggingSettings {
    /// Configured filter directive, falling back to `info`.
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LEVEL)
    }

    /// Parsed output format.
    pub fn format(&self) -> Result<LogFormat, LoggingError> {
        self.format
            .as_deref()
            .map_or_else(|| Ok(LogFormat::default()), LogFormat::from_str)
    }

    /// Configured service name, falling back to this crate's name.
    pub fn service_name(&self) -> &str {
        self.service_name.as_deref().unwrap_or(DEFAULT_SERVICE_NAME)
    }

    /// Configured service version, if any.
    pub fn service_version(&self) -> Option<&str> {
        self.service_version.as_deref()
    }
}

/// Explicitly constructed log sink shared by the middleware and handlers.
///
/// # Examples
/// ```
/// use service_kit::logging::{Logger, LoggingSettings};
///
/// let logger = Logger::with_writer(&LoggingSettings::default(), std::io::sink)
///     .expect("default settings are valid");
/// logger.in_scope(|| tracing::info!("written to the sink, not the global default"));
/// ```
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    service_name: Arc<str>,
    service_version: Option<Arc<str>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("service_name", &self.service_name)
            .field("service_version", &self.service_version)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Logger writing to standard output.
    pub fn from_settings(settings: &LoggingSettings) -> Result<Self, LoggingError> {
        Self::with_writer(settings, std::io::stdout)
    }

    /// Logger writing through `make_writer`.
    pub fn with_writer<W>(settings: &LoggingSettings, make_writer: W) -> Result<Self, LoggingError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let directive = settings.level();
        let filter = EnvFilter::try_new(directive).map_err(|source| LoggingError::InvalidFilter {
            directive: directive.to_owned(),
            source,
        })?;

        let dispatch = match settings.format()? {
            LogFormat::Json => Dispatch::new(
                tracing_subscriber::fmt()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_env_filter(filter)
                    .with_writer(make_writer)
                    .finish(),
            ),
            LogFormat::Pretty => Dispatch::new(
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(make_writer)
                    .finish(),
            ),
        };

        Ok(Self {
            dispatch,
            service_name: Arc::from(settings.service_name()),
            service_version: settings.service_version().map(Arc::from),
        })
    }

    /// Wrap an existing dispatcher.
    pub fn from_dispatch(dispatch: Dispatch, service_name: impl Into<Arc<str>>) -> Self {
        Self {
            dispatch,
            service_name: service_name.into(),
            service_version: None,
        }
    }

    /// Underlying dispatcher.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Service name recorded on request spans.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Service version recorded on request spans.
    pub fn service_version(&self) -> Option<&str> {
        self.service_version.as_deref()
    }

    /// Run `f` with this logger as the thread's default dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}
