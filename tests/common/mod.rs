//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use flight_delay_api::config::Config;
use flight_delay_api::model::artifact::{EstimatorSpec, ModelArtifact, TreeSpec};
use flight_delay_api::server::api::AppState;
use serde_json::{json, Value};

pub const BOUNDARY: &str = "flightdelayboundary";

/// The reference flight: JFK → LAX on Delta, departing ten minutes late.
pub fn sample_flight() -> Value {
    json!({
        "month": 7,
        "day": 23,
        "hour": 16,
        "sched_dep_time": 1630,
        "sched_arr_time": 1930,
        "origin": "JFK",
        "dest": "LAX",
        "carrier": "DL",
        "distance": 3983.0,
        "dep_delay": 10.0
    })
}

/// Linear model: `dep_delay + 2 * carrier_DL + intercept`.
///
/// Predicts `intercept + 12.0` for [`sample_flight`].
pub fn linear_artifact(intercept: f64) -> Vec<u8> {
    let feature_names = [
        "month",
        "day",
        "hour",
        "sched_dep_time",
        "sched_arr_time",
        "distance",
        "dep_delay",
        "carrier_DL",
        "carrier_AA",
        "origin_JFK",
        "dest_LAX",
    ];
    let artifact = ModelArtifact {
        format_version: 1,
        feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
        estimator: EstimatorSpec::Linear {
            intercept,
            coefficients: vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0],
        },
    };
    artifact.to_bytes().unwrap()
}

/// Single-tree forest: `dep_delay <= 5 ? -3 : 25`.
///
/// Predicts `25.0` for [`sample_flight`].
pub fn forest_artifact() -> Vec<u8> {
    let artifact = ModelArtifact {
        format_version: 1,
        feature_names: vec!["dep_delay".to_string(), "origin_JFK".to_string()],
        estimator: EstimatorSpec::RandomForest {
            trees: vec![TreeSpec {
                children_left: vec![1, -1, -1],
                children_right: vec![2, -1, -1],
                feature: vec![0, -2, -2],
                threshold: vec![5.0, -2.0, -2.0],
                value: vec![11.0, -3.0, 25.0],
            }],
        },
    };
    artifact.to_bytes().unwrap()
}

pub fn test_state() -> Arc<AppState> {
    test_state_with(Config::default())
}

pub fn test_state_with(config: Config) -> Arc<AppState> {
    Arc::new(AppState::new(Arc::new(config)).unwrap())
}

/// Encode a single-field multipart/form-data body.
pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}
