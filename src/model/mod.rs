//! Model loading and evaluation.
//!
//! - [`artifact`]: Artifact decoding and structural validation
//! - [`encoder`]: Flight record → feature vector mapping
//! - [`regressor`]: Estimator implementations
//! - [`store`]: Single-slot holder for the active model

pub mod artifact;
pub mod encoder;
pub mod regressor;
pub mod store;
