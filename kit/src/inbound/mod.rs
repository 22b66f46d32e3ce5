//! Inbound adapters translating transport requests into library calls.

pub mod http;
