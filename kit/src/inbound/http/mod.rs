//! HTTP inbound adapter: error responses, probes and body extraction.

pub mod error;
pub mod health;
pub mod validated_json;

pub use error::{ApiResult, route_not_found};
pub use validated_json::ValidatedJson;
