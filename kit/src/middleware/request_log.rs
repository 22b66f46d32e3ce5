//! Request logging middleware.
//!
//! Every request runs inside a `request` span carrying its [`RequestId`],
//! under the injected [`Logger`]'s dispatcher. When the handler finishes, one
//! event describes the request, the response, the caller and, on failure,
//! the classified error. Nothing else in the library writes per-request logs.
//!
//! Tokio task-local variables are not inherited across spawned tasks. Use
//! [`RequestId::scope`] when spawning work that should keep the identifier.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::body::{BodySize, BoxBody, EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use actix_web::{HttpMessage, HttpResponse, ResponseError, web};
use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::instrument::WithSubscriber;
use tracing::{Instrument, error, info, info_span, warn};

use crate::domain::{Error, HttpError, Registry, RequestId, UserContext};
use crate::inbound::http::error::classify;
use crate::logging::{Logger, LoggingSettings};

/// Header read for an inbound request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the request id on every response.
pub const REQUEST_ID_RESPONSE_HEADER: &str = "X-Request-ID";

/// Value logged in place of sensitive headers.
pub const REDACTED: &str = "[REDACTED]";

const SENSITIVE_HEADERS: [&str; 5] = [
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "proxy-authorization",
];

/// Emits one structured record per request.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use service_kit::logging::{Logger, LoggingSettings};
/// use service_kit::middleware::RequestLog;
///
/// let logger = Logger::with_writer(&LoggingSettings::default(), std::io::sink)
///     .expect("default settings are valid");
/// let app = App::new().wrap(RequestLog::new(logger));
/// # let _ = app;
/// ```
#[derive(Debug, Clone)]
pub struct RequestLog {
    config: Arc<LogConfig>,
}

#[derive(Debug, Clone)]
struct LogConfig {
    logger: Logger,
    registry: Option<Arc<Registry>>,
    include_headers: bool,
    include_user_agent: bool,
}

impl RequestLog {
    /// Log through `logger` without headers or user agent.
    pub fn new(logger: Logger) -> Self {
        Self {
            config: Arc::new(LogConfig {
                logger,
                registry: None,
                include_headers: false,
                include_user_agent: false,
            }),
        }
    }

    /// Log through `logger`, taking the header options from `settings`.
    pub fn from_settings(logger: Logger, settings: &LoggingSettings) -> Self {
        Self::new(logger)
            .include_headers(settings.include_headers)
            .include_user_agent(settings.include_user_agent)
    }

    /// Re-resolve service errors through `registry` before they are written.
    #[must_use]
    pub fn with_registry(self, registry: impl Into<Arc<Registry>>) -> Self {
        self.map_config(|config| config.registry = Some(registry.into()))
    }

    /// Record request headers, redacting credentials.
    #[must_use]
    pub fn include_headers(self, enabled: bool) -> Self {
        self.map_config(|config| config.include_headers = enabled)
    }

    /// Record the `User-Agent` header.
    #[must_use]
    pub fn include_user_agent(self, enabled: bool) -> Self {
        self.map_config(|config| config.include_user_agent = enabled)
    }

    fn map_config(self, f: impl FnOnce(&mut LogConfig)) -> Self {
        let mut config = Arc::unwrap_or_clone(self.config);
        f(&mut config);
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequestLogMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLogMiddleware {
            service: Rc::new(service),
            config: Arc::clone(&self.config),
        }))
    }
}

/// Service wrapper produced by [`RequestLog`].
///
/// Applications should not use this type directly.
pub struct RequestLogMiddleware<S> {
    service: Rc<S>,
    config: Arc<LogConfig>,
}

impl<S, B> Service<ServiceRequest> for RequestLogMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = RequestId::from_header_or_generate(
            req.headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok()),
        );
        let snapshot = RequestSnapshot::capture(&req, &self.config);
        let service = Rc::clone(&self.service);
        let registry = self.config.registry.clone();

        let logger = &self.config.logger;
        let span = logger.in_scope(|| {
            info_span!(
                "request",
                request_id = %request_id,
                service = logger.service_name(),
                version = logger.service_version(),
            )
        });

        let handled = async move {
            match service.call(req).await {
                Ok(res) => {
                    let res = res.map_into_left_body();
                    let mut res = match registry.as_deref() {
                        Some(registry) => resolve_response(registry, res),
                        None => res,
                    };
                    attach_request_id(&mut res);
                    Completion::from_response(&res).emit(&snapshot);
                    Ok(res)
                }
                Err(err) => {
                    let err = match registry.as_deref() {
                        Some(registry) => resolve_error(registry, err),
                        None => err,
                    };
                    Completion::from_error(&err, &snapshot).emit(&snapshot);
                    Err(EchoedError::wrap(err).into())
                }
            }
        };

        Box::pin(
            RequestId::scope(request_id, handled.instrument(span))
                .with_subscriber(self.config.logger.dispatch().clone()),
        )
    }
}

fn resolved_by(registry: &Registry, err: &actix_web::Error) -> Option<HttpError> {
    err.as_error::<Error>().map(|err| registry.resolve(err))
}

/// Rewrite the response when a service error is attached.
fn resolve_response<B>(
    registry: &Registry,
    res: ServiceResponse<EitherBody<B>>,
) -> ServiceResponse<EitherBody<B>>
where
    B: MessageBody + 'static,
{
    let Some(resolved) = res
        .response()
        .error()
        .and_then(|err| resolved_by(registry, err))
    else {
        return res;
    };

    let (request, _) = res.into_parts();
    ServiceResponse::new(request, HttpResponse::from_error(resolved)).map_into_right_body()
}

fn resolve_error(registry: &Registry, err: actix_web::Error) -> actix_web::Error {
    match resolved_by(registry, &err) {
        Some(resolved) => resolved.into(),
        None => err,
    }
}

fn attach_request_id<B>(res: &mut ServiceResponse<B>) {
    if let Some(id) = RequestId::current() {
        insert_request_id(res.headers_mut(), &id);
    }
}

fn insert_request_id(headers: &mut HeaderMap, id: &RequestId) {
    match HeaderValue::from_str(id.as_str()) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }
        Err(error) => {
            error!(%error, request_id = %id, "failed to encode request id header");
        }
    }
}

/// Service error re-raised with the request id it was logged under.
///
/// The dispatcher renders `Err` results after the request scope has ended, so
/// the id travels with the error instead of through the task-local.
#[derive(Debug)]
struct EchoedError {
    inner: actix_web::Error,
    request_id: Option<RequestId>,
}

impl EchoedError {
    fn wrap(inner: actix_web::Error) -> Self {
        Self {
            inner,
            request_id: RequestId::current(),
        }
    }
}

impl fmt::Display for EchoedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl ResponseError for EchoedError {
    fn status_code(&self) -> StatusCode {
        self.inner.as_response_error().status_code()
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let mut res = self.inner.error_response();
        if let Some(id) = &self.request_id {
            insert_request_id(res.headers_mut(), id);
        }
        res
    }
}

/// Request fields known before the handler runs.
struct RequestSnapshot {
    method: String,
    path: String,
    query: String,
    user_agent: Option<String>,
    headers: Option<String>,
    started_at: DateTime<Utc>,
    start: Instant,
}

impl RequestSnapshot {
    fn capture(req: &ServiceRequest, config: &LogConfig) -> Self {
        let user_agent = config.include_user_agent.then(|| {
            req.headers()
                .get(header::USER_AGENT)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_owned()
        });
        let headers = config
            .include_headers
            .then(|| to_json(&redacted_headers(req.headers())));

        Self {
            method: req.method().to_string(),
            path: req.path().to_owned(),
            query: to_json(&query_pairs(req.query_string())),
            user_agent,
            headers,
            started_at: Utc::now(),
            start: Instant::now(),
        }
    }
}

fn query_pairs(query: &str) -> BTreeMap<String, String> {
    web::Query::<BTreeMap<String, String>>::from_query(query)
        .map(web::Query::into_inner)
        .unwrap_or_default()
}

fn redacted_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let name = name.as_str().to_owned();
            let value = if SENSITIVE_HEADERS.contains(&name.as_str()) {
                REDACTED.to_owned()
            } else {
                value.to_str().unwrap_or(REDACTED).to_owned()
            };
            (name, value)
        })
        .collect()
}

fn to_json(value: &BTreeMap<String, String>) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    fn for_status(status: u16) -> Self {
        match status {
            500.. => Self::Error,
            400..=499 => Self::Warn,
            _ => Self::Info,
        }
    }
}

/// Response fields known once the handler finished.
struct Completion {
    status: u16,
    body_length: Option<u64>,
    route: String,
    route_name: Option<String>,
    params: BTreeMap<String, String>,
    user: UserContext,
    failure: Option<HttpError>,
}

impl Completion {
    fn from_response<B: MessageBody>(res: &ServiceResponse<B>) -> Self {
        let request = res.request();
        let body_length = match res.response().body().size() {
            BodySize::Sized(len) => Some(len),
            BodySize::None => Some(0),
            BodySize::Stream => None,
        };

        Self {
            status: res.status().as_u16(),
            body_length,
            route: request.match_pattern().unwrap_or_else(|| request.path().to_owned()),
            route_name: request.match_name().map(str::to_owned),
            params: request
                .match_info()
                .iter()
                .map(|(name, value)| (name.to_owned(), value.to_owned()))
                .collect(),
            user: request
                .extensions()
                .get::<UserContext>()
                .cloned()
                .unwrap_or_default(),
            failure: res.response().error().map(classify),
        }
    }

    fn from_error(err: &actix_web::Error, snapshot: &RequestSnapshot) -> Self {
        Self {
            status: err.as_response_error().status_code().as_u16(),
            body_length: None,
            route: snapshot.path.clone(),
            route_name: None,
            params: BTreeMap::new(),
            user: UserContext::default(),
            failure: Some(classify(err)),
        }
    }

    fn message(&self) -> String {
        let prefix = self
            .route_name
            .as_deref()
            .map(|name| format!("{name}: "))
            .unwrap_or_default();
        match &self.failure {
            Some(err) => format!("{prefix}[{}] {}", err.code(), err.message()),
            None => format!("{prefix}request completed"),
        }
    }

    /// Write the single record for this request.
    fn emit(&self, snapshot: &RequestSnapshot) {
        let duration_ms = u64::try_from(snapshot.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let message = self.message();
        let request_id = RequestId::current().map(|id| id.to_string());
        let params = to_json(&self.params);
        let start_time = snapshot
            .started_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let end_time = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let permissions = self.user.permissions_or_unknown();
        let failure = self.failure.as_ref();
        let details = failure.map(|err| err.details().join("; "));

        macro_rules! record {
            ($level:ident) => {
                $level!(
                    request_id = request_id.as_deref(),
                    duration_ms,
                    request.method = %snapshot.method,
                    request.path = %snapshot.path,
                    request.route = %self.route,
                    request.params = %params,
                    request.query = %snapshot.query,
                    request.user_agent = snapshot.user_agent.as_deref(),
                    request.headers = snapshot.headers.as_deref(),
                    request.start_time = %start_time,
                    response.status = self.status,
                    response.body_length = self.body_length,
                    response.end_time = %end_time,
                    user.email = self.user.email_or_unknown(),
                    user.company = self.user.company_or_unknown(),
                    user.company_category = self.user.company_category_or_unknown(),
                    user.permissions = %permissions,
                    error.code = failure.map(HttpError::code),
                    error.category = failure.map(|err| err.category().as_str()),
                    error.message = failure.map(HttpError::message),
                    error.details = details.as_deref(),
                    error.cause = failure.and_then(HttpError::cause),
                    "{message}"
                )
            };
        }

        match Severity::for_status(self.status) {
            Severity::Error => record!(error),
            Severity::Warn => record!(warn),
            Severity::Info => record!(info),
        }
    }
}
