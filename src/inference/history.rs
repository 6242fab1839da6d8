//! Append-only log of served predictions.

use serde::Serialize;

use crate::inference::features::FlightFeatures;

/// One served prediction and the input it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub input: FlightFeatures,
    pub prediction: f64,
}

impl PredictionRecord {
    pub fn new(input: FlightFeatures, prediction: f64) -> Self {
        Self { input, prediction }
    }
}

/// Predictions in the order they were made. Unbounded, lives as long as the
/// process.
#[derive(Debug, Default)]
pub struct HistoryLog {
    records: Vec<PredictionRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: PredictionRecord) {
        self.records.push(record);
    }

    pub fn all(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
