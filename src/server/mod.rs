//! HTTP server for the prediction API.
//!
//! - [`api`]: Routes, handlers and shared state
//! - [`error`]: Failure → status code mapping
//! - [`metrics`]: Prometheus counters exported at `/metrics`
//! - [`openapi`]: Static API description

pub mod api;
pub mod error;
pub mod metrics;
pub mod openapi;
