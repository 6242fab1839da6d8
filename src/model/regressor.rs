//! Regression predictors behind the [`Regressor`] trait.
//!
//! Training happens elsewhere; these types only evaluate exported parameters.
//!
//! - Linear: f(x) = w·x + b
//! - Random forest: mean of tree outputs
//! - Gradient boosting: init + lr * Σ tree outputs

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure while evaluating a loaded model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("feature vector has {actual} columns but the model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model produced a non-finite prediction ({0})")]
    NonFinite(f64),
}

/// Estimator family of a loaded model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    RandomForest,
    GradientBoosting,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Linear => write!(f, "linear"),
            ModelKind::RandomForest => write!(f, "random_forest"),
            ModelKind::GradientBoosting => write!(f, "gradient_boosting"),
        }
    }
}

/// A fitted model mapping a dense feature vector to a scalar.
pub trait Regressor: Send + Sync {
    /// Estimator family.
    fn kind(&self) -> ModelKind;

    /// Number of input columns the model was fitted on.
    fn n_features(&self) -> usize;

    /// Predict a single sample.
    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError>;
}

fn check_shape(expected: usize, features: &[f64]) -> Result<(), InferenceError> {
    if features.len() != expected {
        return Err(InferenceError::ShapeMismatch {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

fn check_finite(value: f64) -> Result<f64, InferenceError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InferenceError::NonFinite(value))
    }
}

// ─── Linear ────────────────────────────────────────────────────────────────

/// Ordinary linear regression.
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    intercept: f64,
    coefficients: Array1<f64>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients: Array1::from_vec(coefficients),
        }
    }
}

impl Regressor for LinearRegressor {
    fn kind(&self) -> ModelKind {
        ModelKind::Linear
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_shape(self.n_features(), features)?;
        let x = ArrayView1::from(features);
        check_finite(self.coefficients.dot(&x) + self.intercept)
    }
}

// ─── Trees ─────────────────────────────────────────────────────────────────

/// A node of a fitted regression tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TreeNode {
    /// Route to `left` when `x[feature] <= threshold`, otherwise to `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// A single regression tree stored as a flat node array rooted at index 0.
///
/// Children always sit at a higher index than their parent, so evaluation
/// terminates. The artifact decoder enforces this before constructing a tree.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub(crate) fn from_nodes(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    /// Walk from the root to a leaf. `features` must already be shape-checked.
    fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf(value) => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Bagged ensemble averaging its trees.
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn new(n_features: usize, trees: Vec<RegressionTree>) -> Self {
        Self { n_features, trees }
    }
}

impl Regressor for RandomForestRegressor {
    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_shape(self.n_features, features)?;
        let sum: f64 = self.trees.iter().map(|t| t.evaluate(features)).sum();
        check_finite(sum / self.trees.len() as f64)
    }
}

/// Boosted ensemble: additive trees scaled by the learning rate.
#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    n_features: usize,
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostingRegressor {
    pub fn new(n_features: usize, init: f64, learning_rate: f64, trees: Vec<RegressionTree>) -> Self {
        Self {
            n_features,
            init,
            learning_rate,
            trees,
        }
    }
}

impl Regressor for GradientBoostingRegressor {
    fn kind(&self) -> ModelKind {
        ModelKind::GradientBoosting
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_shape(self.n_features, features)?;
        let sum: f64 = self.trees.iter().map(|t| t.evaluate(features)).sum();
        check_finite(self.init + self.learning_rate * sum)
    }
}
