//! Liveness and readiness probes for orchestrators and load balancers.
//! Documented in OpenAPI via Utoipa.
use actix_web::{HttpResponse, get, http::header, web};

fn probe_response() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Readiness probe. Always 200 once the server accepts connections.
#[utoipa::path(
    get,
    path = "/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 405, description = "Method not allowed; only GET probes are supported")
    )
)]
#[get("/ready")]
pub async fn ready() -> HttpResponse {
    probe_response()
}

/// Liveness probe. Always 200 while the process serves requests.
#[utoipa::path(
    get,
    path = "/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 405, description = "Method not allowed; only GET probes are supported")
    )
)]
#[get("/live")]
pub async fn live() -> HttpResponse {
    probe_response()
}

/// Register both probes on an app or scope.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use service_kit::inbound::http::health;
///
/// let app = App::new().configure(health::configure);
/// # let _ = app;
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(live).service(ready);
}
