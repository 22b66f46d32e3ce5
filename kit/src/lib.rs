//! Shared plumbing for actix-web service backends.
//!
//! - [`domain`]: the error model (templates, domain errors, validation
//!   failures, client-facing [`domain::HttpError`]), the code registry, the
//!   request id and the caller context.
//! - [`validation`]: struct validation with translated messages.
//! - [`inbound::http`]: the actix adapter (error responses, validated JSON,
//!   health probes, the 404 fallback).
//! - [`middleware`]: one structured log record per request.
//! - [`logging`]: OrthoConfig settings and the injected [`logging::Logger`].

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod logging;
pub mod middleware;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_utils;

/// Public OpenAPI surface for the probes and error envelope.
pub use doc::ApiDoc;
