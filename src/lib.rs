//! flight-delay-api: serves flight arrival-delay predictions.
//!
//! A trained regression model is uploaded as an artifact, held in memory,
//! and evaluated on ten-field flight records received over HTTP. Every
//! successful prediction is kept in an in-process history log.

pub mod config;
pub mod inference;
pub mod model;
pub mod server;
