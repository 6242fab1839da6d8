//! Model artifact decoding.
//!
//! An artifact is a JSON document exported by the training pipeline. It
//! declares the feature layout (`feature_names`, mirroring the training
//! library's fitted column names) and the fitted parameters of one estimator.
//! Decoding validates the whole structure up front so a loaded model can only
//! fail at inference time on its numeric output.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::model::encoder::FeatureEncoder;
use crate::model::regressor::{
    GradientBoostingRegressor, LinearRegressor, RandomForestRegressor, RegressionTree, Regressor,
    TreeNode,
};
use crate::model::store::LoadedModel;

/// Artifact format version understood by this build.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Sentinel used by the flat tree layout for "no child".
const TREE_LEAF: i64 = -1;

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("Artifact is empty")]
    Empty,

    #[error("Artifact is not a valid model document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

fn invalid(msg: impl Into<String>) -> ModelLoadError {
    ModelLoadError::Invalid(msg.into())
}

/// Serialized model document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,

    /// Column names in the order the estimator consumes them.
    pub feature_names: Vec<String>,

    #[serde(flatten)]
    pub estimator: EstimatorSpec,
}

/// Fitted estimator parameters, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorSpec {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    RandomForest {
        trees: Vec<TreeSpec>,
    },
    GradientBoosting {
        init: f64,
        learning_rate: f64,
        trees: Vec<TreeSpec>,
    },
}

/// Flat array layout of one fitted regression tree.
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise samples with
/// `x[feature[i]] <= threshold[i]` go to `children_left[i]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeSpec {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl ModelArtifact {
    /// Parse raw bytes without structural validation.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, ModelLoadError> {
        if raw.is_empty() {
            return Err(ModelLoadError::Empty);
        }
        let artifact: ModelArtifact = serde_json::from_slice(raw)?;
        if artifact.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ModelLoadError::UnsupportedVersion {
                found: artifact.format_version,
                expected: SUPPORTED_FORMAT_VERSION,
            });
        }
        Ok(artifact)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelLoadError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Validate the parameters and build the estimator.
    pub fn build_regressor(&self) -> Result<Box<dyn Regressor>, ModelLoadError> {
        let n_features = self.feature_names.len();
        if n_features == 0 {
            return Err(invalid("feature_names is empty"));
        }
        let mut seen = HashSet::new();
        for name in &self.feature_names {
            if !seen.insert(name.as_str()) {
                return Err(invalid(format!("duplicate feature name {name:?}")));
            }
        }

        match &self.estimator {
            EstimatorSpec::Linear {
                intercept,
                coefficients,
            } => {
                if coefficients.len() != n_features {
                    return Err(invalid(format!(
                        "{} coefficients for {} features",
                        coefficients.len(),
                        n_features
                    )));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(invalid("linear parameters must be finite"));
                }
                Ok(Box::new(LinearRegressor::new(*intercept, coefficients.clone())))
            }
            EstimatorSpec::RandomForest { trees } => {
                let trees = build_trees(trees, n_features)?;
                Ok(Box::new(RandomForestRegressor::new(n_features, trees)))
            }
            EstimatorSpec::GradientBoosting {
                init,
                learning_rate,
                trees,
            } => {
                if !init.is_finite() {
                    return Err(invalid("init must be finite"));
                }
                if !learning_rate.is_finite() || *learning_rate <= 0.0 {
                    return Err(invalid(format!(
                        "learning_rate must be positive, got {learning_rate}"
                    )));
                }
                let trees = build_trees(trees, n_features)?;
                Ok(Box::new(GradientBoostingRegressor::new(
                    n_features,
                    *init,
                    *learning_rate,
                    trees,
                )))
            }
        }
    }
}

fn build_trees(specs: &[TreeSpec], n_features: usize) -> Result<Vec<RegressionTree>, ModelLoadError> {
    if specs.is_empty() {
        return Err(invalid("ensemble has no trees"));
    }
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| build_tree(spec, n_features).map_err(|e| invalid(format!("tree {i}: {e}"))))
        .collect()
}

fn build_tree(spec: &TreeSpec, n_features: usize) -> Result<RegressionTree, String> {
    let n = spec.children_left.len();
    if n == 0 {
        return Err("tree has no nodes".to_string());
    }
    if spec.children_right.len() != n
        || spec.feature.len() != n
        || spec.threshold.len() != n
        || spec.value.len() != n
    {
        return Err("node arrays have different lengths".to_string());
    }

    let child = |parent: usize, raw: i64| -> Result<usize, String> {
        usize::try_from(raw)
            .ok()
            .filter(|&c| c > parent && c < n)
            .ok_or_else(|| format!("node {parent} has invalid child index {raw}"))
    };

    let mut nodes = Vec::with_capacity(n);
    for i in 0..n {
        let (left, right) = (spec.children_left[i], spec.children_right[i]);
        if left == TREE_LEAF && right == TREE_LEAF {
            let value = spec.value[i];
            if !value.is_finite() {
                return Err(format!("leaf {i} has non-finite value"));
            }
            nodes.push(TreeNode::Leaf(value));
            continue;
        }

        let feature = usize::try_from(spec.feature[i])
            .ok()
            .filter(|&f| f < n_features)
            .ok_or_else(|| format!("node {i} splits on unknown feature {}", spec.feature[i]))?;
        let threshold = spec.threshold[i];
        if !threshold.is_finite() {
            return Err(format!("node {i} has non-finite threshold"));
        }
        nodes.push(TreeNode::Split {
            feature,
            threshold,
            left: child(i, left)?,
            right: child(i, right)?,
        });
    }

    Ok(RegressionTree::from_nodes(nodes))
}

/// Decode and validate an artifact into a ready-to-serve model.
pub fn decode(raw: &[u8]) -> Result<LoadedModel, ModelLoadError> {
    let artifact = ModelArtifact::from_bytes(raw)?;
    let regressor = artifact.build_regressor()?;
    let encoder = FeatureEncoder::new(&artifact.feature_names);

    let unrecognized = encoder.unrecognized();
    if !unrecognized.is_empty() {
        warn!(
            columns = ?unrecognized,
            "Artifact declares columns with no matching flight field; they will encode as 0"
        );
    }

    let model = LoadedModel::new(Uuid::new_v4(), raw.len(), encoder, regressor);

    info!(
        model_id = %model.id(),
        kind = %model.kind(),
        features = model.n_features(),
        bytes = raw.len(),
        "Decoded model artifact"
    );

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::regressor::ModelKind;
    use serde_json::json;

    fn stump() -> TreeSpec {
        TreeSpec {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![5.0, -2.0, -2.0],
            value: vec![0.0, -3.0, 25.0],
        }
    }

    fn forest(trees: Vec<TreeSpec>) -> ModelArtifact {
        ModelArtifact {
            format_version: SUPPORTED_FORMAT_VERSION,
            feature_names: vec!["dep_delay".to_string()],
            estimator: EstimatorSpec::RandomForest { trees },
        }
    }

    #[test]
    fn test_decode_linear() {
        let raw = serde_json::to_vec(&json!({
            "format_version": 1,
            "kind": "linear",
            "feature_names": ["dep_delay", "distance"],
            "intercept": -5.0,
            "coefficients": [1.0, 0.001]
        }))
        .unwrap();
        let model = decode(&raw).unwrap();
        assert_eq!(model.kind(), ModelKind::Linear);
        assert_eq!(model.n_features(), 2);
        assert_eq!(model.artifact_bytes(), raw.len());
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let artifact = forest(vec![stump()]);
        let parsed = ModelArtifact::from_bytes(&artifact.to_bytes().unwrap()).unwrap();
        let regressor = parsed.build_regressor().unwrap();
        assert_eq!(regressor.kind(), ModelKind::RandomForest);
    }

    #[test]
    fn test_empty_bytes() {
        assert!(matches!(decode(b""), Err(ModelLoadError::Empty)));
    }

    #[test]
    fn test_not_json() {
        let csv = b"year,month,day\n2013,1,1\n";
        assert!(matches!(decode(csv), Err(ModelLoadError::Malformed(_))));
    }

    #[test]
    fn test_unknown_kind() {
        let raw = br#"{"format_version":1,"kind":"svm","feature_names":["month"]}"#;
        assert!(matches!(decode(raw), Err(ModelLoadError::Malformed(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let mut artifact = forest(vec![stump()]);
        artifact.format_version = 2;
        let raw = serde_json::to_vec(&artifact).unwrap();
        assert!(matches!(
            decode(&raw),
            Err(ModelLoadError::UnsupportedVersion { found: 2, expected: 1 })
        ));
    }

    #[test]
    fn test_coefficient_count_mismatch() {
        let artifact = ModelArtifact {
            format_version: 1,
            feature_names: vec!["month".to_string(), "day".to_string()],
            estimator: EstimatorSpec::Linear {
                intercept: 0.0,
                coefficients: vec![1.0],
            },
        };
        assert!(matches!(
            artifact.build_regressor(),
            Err(ModelLoadError::Invalid(_))
        ));
    }

    #[test]
    fn test_duplicate_feature_names() {
        let artifact = ModelArtifact {
            format_version: 1,
            feature_names: vec!["month".to_string(), "month".to_string()],
            estimator: EstimatorSpec::Linear {
                intercept: 0.0,
                coefficients: vec![1.0, 1.0],
            },
        };
        assert!(artifact.build_regressor().is_err());
    }

    #[test]
    fn test_empty_forest_rejected() {
        assert!(forest(vec![]).build_regressor().is_err());
    }

    #[test]
    fn test_tree_array_length_mismatch() {
        let mut tree = stump();
        tree.value.pop();
        assert!(forest(vec![tree]).build_regressor().is_err());
    }

    #[test]
    fn test_tree_backward_child_rejected() {
        let mut tree = stump();
        tree.children_left = vec![1, 0, -1];
        tree.children_right = vec![2, 2, -1];
        tree.feature = vec![0, 0, -2];
        let err = forest(vec![tree]).build_regressor().err().unwrap();
        assert!(err.to_string().contains("invalid child index"));
    }

    #[test]
    fn test_tree_feature_out_of_range() {
        let mut tree = stump();
        tree.feature[0] = 4;
        assert!(forest(vec![tree]).build_regressor().is_err());
    }

    #[test]
    fn test_non_positive_learning_rate() {
        let artifact = ModelArtifact {
            format_version: 1,
            feature_names: vec!["dep_delay".to_string()],
            estimator: EstimatorSpec::GradientBoosting {
                init: 0.0,
                learning_rate: 0.0,
                trees: vec![stump()],
            },
        };
        assert!(artifact.build_regressor().is_err());
    }
}
