//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every service, currently the
//! request id and the per-request log record.

pub mod request_log;

pub use request_log::{
    REQUEST_ID_HEADER, REQUEST_ID_RESPONSE_HEADER, RequestLog, RequestLogMiddleware,
};
