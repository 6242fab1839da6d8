//! The single-slot model store.

use std::sync::Arc;

use uuid::Uuid;

use crate::inference::features::FlightFeatures;
use crate::model::artifact::{self, ModelLoadError};
use crate::model::encoder::FeatureEncoder;
use crate::model::regressor::{InferenceError, ModelKind, Regressor};

/// A decoded model together with the encoder for its column layout.
pub struct LoadedModel {
    id: Uuid,
    artifact_bytes: usize,
    encoder: FeatureEncoder,
    regressor: Box<dyn Regressor>,
}

/// Shared reference to the model currently being served.
pub type ModelHandle = Arc<LoadedModel>;

impl LoadedModel {
    pub fn new(
        id: Uuid,
        artifact_bytes: usize,
        encoder: FeatureEncoder,
        regressor: Box<dyn Regressor>,
    ) -> Self {
        Self {
            id,
            artifact_bytes,
            encoder,
            regressor,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> ModelKind {
        self.regressor.kind()
    }

    pub fn n_features(&self) -> usize {
        self.regressor.n_features()
    }

    pub fn artifact_bytes(&self) -> usize {
        self.artifact_bytes
    }

    /// Encode a validated record and run the estimator on it.
    pub fn predict(&self, features: &FlightFeatures) -> Result<f64, InferenceError> {
        let x = self.encoder.encode(features);
        tracing::debug!(model_id = %self.id, encoded = ?x, "Encoded feature vector");
        self.regressor.predict(&x)
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("n_features", &self.n_features())
            .field("artifact_bytes", &self.artifact_bytes)
            .finish()
    }
}

/// Holds at most one model. Starts empty; every successful load replaces
/// the previous handle wholesale.
#[derive(Debug, Default)]
pub struct ModelStore {
    current: Option<ModelHandle>,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `raw` and install it. On error the current handle is kept.
    pub fn load(&mut self, raw: &[u8]) -> Result<ModelHandle, ModelLoadError> {
        let handle = Arc::new(artifact::decode(raw)?);
        self.install(handle.clone());
        Ok(handle)
    }

    /// Replace the current handle, returning the one it displaced.
    pub fn install(&mut self, handle: ModelHandle) -> Option<ModelHandle> {
        self.current.replace(handle)
    }

    pub fn has_model(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_handle(&self) -> Option<ModelHandle> {
        self.current.clone()
    }
}
