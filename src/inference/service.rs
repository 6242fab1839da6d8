//! Prediction service: the model store and history log behind one lock.
//!
//! `load_model` and `predict` take the write side, `history` the read side,
//! so a prediction always pairs with the handle that produced it and a
//! reader never observes a half-applied update. Artifact decoding happens
//! before the lock is taken.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::inference::features::{FlightFeatures, ValidationError};
use crate::inference::history::{HistoryLog, PredictionRecord};
use crate::model::artifact::{self, ModelLoadError};
use crate::model::regressor::InferenceError;
use crate::model::store::{ModelHandle, ModelStore};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error(transparent)]
    Deserialization(#[from] ModelLoadError),

    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
}

impl ServiceError {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::ModelNotLoaded => "model_not_loaded",
            ServiceError::Deserialization(_) => "deserialization_error",
            ServiceError::Inference(_) => "inference_error",
        }
    }
}

#[derive(Debug, Default)]
struct ServingState {
    store: ModelStore,
    history: HistoryLog,
}

/// Per-process serving state. Replicas do not share it.
#[derive(Debug, Default)]
pub struct InferenceService {
    state: RwLock<ServingState>,
}

impl InferenceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an artifact and make it the active model.
    ///
    /// A failed decode leaves the previously active model in place.
    pub async fn load_model(&self, raw: &[u8]) -> Result<ModelHandle, ServiceError> {
        let handle = Arc::new(artifact::decode(raw)?);

        let previous = self.state.write().await.store.install(handle.clone());

        info!(
            model_id = %handle.id(),
            kind = %handle.kind(),
            features = handle.n_features(),
            bytes = handle.artifact_bytes(),
            replaced = ?previous.map(|p| p.id()),
            "Model loaded"
        );

        Ok(handle)
    }

    /// Validate, run the active model, and record the result.
    pub async fn predict(&self, features: FlightFeatures) -> Result<f64, ServiceError> {
        let features = features.validate()?;

        let mut state = self.state.write().await;
        let handle = state
            .store
            .current_handle()
            .ok_or(ServiceError::ModelNotLoaded)?;

        let prediction = handle.predict(&features)?;
        state
            .history
            .append(PredictionRecord::new(features, prediction));

        debug!(
            model_id = %handle.id(),
            prediction,
            history_len = state.history.len(),
            "Prediction recorded"
        );

        Ok(prediction)
    }

    /// Snapshot of every recorded prediction, oldest first.
    pub async fn history(&self) -> Vec<PredictionRecord> {
        self.state.read().await.history.all().to_vec()
    }

    pub async fn history_len(&self) -> usize {
        self.state.read().await.history.len()
    }

    pub async fn current_model(&self) -> Option<ModelHandle> {
        self.state.read().await.store.current_handle()
    }
}
