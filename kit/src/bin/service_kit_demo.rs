//! Demo service: wires the request log, the error registry, validated JSON
//! and the health probes into one actix-web app.

use std::io;
use std::sync::Arc;

use actix_web::{App, HttpMessage, HttpRequest, HttpResponse, HttpServer, web};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use service_kit::domain::{ACTION_DENIED, ApiResult, ErrorTemplate, Registry, UserContext};
use service_kit::inbound::http::{ValidatedJson, health, route_not_found};
use service_kit::logging::{Logger, LoggingSettings};
use service_kit::middleware::RequestLog;
use service_kit::validation::{FieldLabels, Validator, not_blank};

const CLAIM_NOT_FOUND: ErrorTemplate = ErrorTemplate::new("CLAIM_NOT_FOUND", "claim {} not found");
const CLAIM_CLOSED: ErrorTemplate = ErrorTemplate::new("CLAIM_CLOSED", "claim {} is closed");

#[derive(Debug, Deserialize, Validate)]
struct NewClaim {
    #[validate(custom(function = "not_blank"))]
    title: String,
    #[validate(email)]
    reporter: String,
    #[validate(range(min = 1, max = 1_000_000))]
    amount: u32,
}

#[derive(Debug, Deserialize, Validate)]
struct OwnerChange {
    #[validate(email)]
    owner: String,
    #[validate(length(min = 3, max = 200))]
    reason: String,
}

impl FieldLabels for OwnerChange {
    fn label(field: &str) -> Option<&'static str> {
        match field {
            "owner" => Some("Responsável"),
            "reason" => Some("Motivo"),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct Claim {
    id: u64,
    title: String,
    amount: u32,
}

fn caller(req: &HttpRequest) -> UserContext {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let mut user = UserContext::default();
    if let Some(email) = header("x-user-email") {
        user = user.with_email(email);
    }
    if let Some(company) = header("x-user-company") {
        user = user.with_company(company);
    }
    if let Some(permissions) = header("x-user-permissions") {
        user = user.with_permissions(permissions.split(',').map(str::trim));
    }
    user
}

async fn create_claim(body: ValidatedJson<NewClaim>) -> HttpResponse {
    let claim = body.into_inner();
    info!(reporter = %claim.reporter, "claim received");
    HttpResponse::Created().json(Claim {
        id: 1,
        title: claim.title,
        amount: claim.amount,
    })
}

async fn get_claim(req: HttpRequest, path: web::Path<u64>) -> ApiResult<HttpResponse> {
    let user = caller(&req);
    let allowed = user.permissions.iter().any(|p| p == "claims:read");
    req.extensions_mut().insert(user);

    let id = path.into_inner();
    if !allowed {
        return Err(ACTION_DENIED.error().into());
    }
    if id != 1 {
        return Err(CLAIM_NOT_FOUND.builder().arg(id).build().into());
    }
    Ok(HttpResponse::Ok().json(Claim {
        id,
        title: "Vidro quebrado".to_owned(),
        amount: 350,
    }))
}

async fn change_owner(
    path: web::Path<u64>,
    body: web::Json<OwnerChange>,
    validator: web::Data<Validator>,
) -> ApiResult<HttpResponse> {
    validator.validate_labelled(&body.0)?;
    let id = path.into_inner();
    if id == 2 {
        return Err(CLAIM_CLOSED.builder().arg(id).build().into());
    }
    Ok(HttpResponse::NoContent().finish())
}

fn registry() -> Registry {
    Registry::new()
        .register(&CLAIM_NOT_FOUND, "ERR-N001", 404)
        .register(&CLAIM_CLOSED, "ERR-B001", 409)
        .register(&ACTION_DENIED, "ERR-P001", 403)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    let settings = LoggingSettings::load().map_err(|err| io::Error::other(err.to_string()))?;
    let logger = Logger::from_settings(&settings).map_err(io::Error::other)?;
    let request_log = RequestLog::from_settings(logger.clone(), &settings)
        .with_registry(Arc::new(registry()));
    let validator = web::Data::new(Validator::new());

    logger.in_scope(|| info!(service = logger.service_name(), "starting on 0.0.0.0:8080"));

    HttpServer::new(move || {
        App::new()
            .wrap(request_log.clone())
            .app_data(validator.clone())
            .configure(health::configure)
            .service(
                web::scope("/claims")
                    .route("", web::post().to(create_claim))
                    .service(
                        web::resource("/{id}")
                            .name("get-claim")
                            .route(web::get().to(get_claim)),
                    )
                    .service(
                        web::resource("/{id}/owner")
                            .name("change-owner")
                            .route(web::put().to(change_owner)),
                    ),
            )
            .default_service(web::to(route_not_found))
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
