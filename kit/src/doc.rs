//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] documents the health probes and the error envelope shared by
//! every endpoint. Services merge it into their own document with
//! [`utoipa::openapi::OpenApi::merge`].

use utoipa::OpenApi;

use crate::domain::{ErrorEnvelope, HttpError};

/// OpenAPI document for the routes and payloads this crate provides.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "service-kit",
        description = "Health probes and the shared error envelope.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(HttpError, ErrorEnvelope)),
    tags(
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_documents_the_wire_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error = schemas.get("HttpError").expect("HttpError schema");

        for field in ["code", "message", "details", "status_code"] {
            assert_object_schema_has_field(error, field);
        }
        match error {
            RefOr::T(Schema::Object(obj)) => assert!(!obj.properties.contains_key("cause")),
            _ => panic!("expected Object schema"),
        }
        assert_object_schema_has_field(
            schemas.get("ErrorEnvelope").expect("ErrorEnvelope schema"),
            "error",
        );
    }

    #[rstest]
    #[case("/live")]
    #[case("/ready")]
    fn health_probes_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }
}
