/// Classifier abstraction
///
/// The recommendation pipeline only needs a trained binary classifier that
/// labels rows as liked / not liked with a probability. Training happens
/// offline; at runtime a model is loaded once and shared read-only.
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{CandidateRow, Prediction},
};

pub mod decision_tree;

pub use decision_tree::DecisionTreeClassifier;

/// Descriptive metadata about the loaded model
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelInfo {
    pub model_type: String,
    pub feature_names: Vec<String>,
    /// Rows the model was trained on, as recorded in the artifact
    pub trained_on: usize,
}

/// Trait for trained like/dislike classifiers
///
/// Implementations must return exactly one prediction per input row, in
/// input order.
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync {
    /// Predicts label and positive-class probability for each row
    fn predict(&self, rows: &[CandidateRow]) -> AppResult<Vec<Prediction>>;

    /// Model metadata for diagnostics endpoints
    fn info(&self) -> ModelInfo;
}
