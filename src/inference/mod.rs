//! Flight-delay prediction.
//!
//! - [`features`]: Request record and validation
//! - [`history`]: Append-only prediction log
//! - [`service`]: Lock-guarded serving state

pub mod features;
pub mod history;
pub mod service;
