/// Decision tree classifier loaded from a JSON export
///
/// The tree is exported by the offline training job. Internal nodes either
/// compare a categorical feature against a value (case-insensitive) or a
/// numeric feature against a threshold; leaves hold class weights.
use serde::Deserialize;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{CandidateRow, Prediction},
    services::classifier::{Classifier, ModelInfo},
};

/// Probability above which a row is labelled liked
const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalFeature {
    EventType,
    Location,
    TimeOfDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFeature {
    Duration,
    PopularityScore,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Category {
        feature: CategoricalFeature,
        equals: String,
        matched: Box<TreeNode>,
        otherwise: Box<TreeNode>,
    },
    /// `value <= threshold` goes left
    Threshold {
        feature: NumericFeature,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        negative: f64,
        positive: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTreeClassifier {
    #[serde(default = "default_model_type")]
    model_type: String,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    trained_on: usize,
    root: TreeNode,
}

fn default_model_type() -> String {
    "DecisionTreeClassifier".to_string()
}

impl DecisionTreeClassifier {
    /// Loads a model artifact from disk
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let model = Self::from_json(&raw)?;

        tracing::info!(
            path = %path.display(),
            model_type = %model.model_type,
            leaves = model.leaf_count(),
            "Classifier loaded"
        );

        Ok(model)
    }

    /// Parses and validates a model artifact
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let model: Self = serde_json::from_str(raw)?;
        validate_node(&model.root)?;
        Ok(model)
    }

    fn leaf_count(&self) -> usize {
        fn count(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Category { matched, otherwise, .. } => count(matched) + count(otherwise),
                TreeNode::Threshold { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }

    fn predict_row(&self, row: &CandidateRow) -> Prediction {
        let mut node = &self.root;
        loop {
            node = match node {
                TreeNode::Category {
                    feature,
                    equals,
                    matched,
                    otherwise,
                } => {
                    let value = match feature {
                        CategoricalFeature::EventType => row.event_type.as_str(),
                        CategoricalFeature::Location => row.location.as_str(),
                        CategoricalFeature::TimeOfDay => row.time_of_day.as_str(),
                    };
                    if value.eq_ignore_ascii_case(equals.trim()) {
                        &**matched
                    } else {
                        &**otherwise
                    }
                }
                TreeNode::Threshold {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = match feature {
                        NumericFeature::Duration => f64::from(row.duration),
                        NumericFeature::PopularityScore => row.popularity_score,
                    };
                    if value <= *threshold {
                        &**left
                    } else {
                        &**right
                    }
                }
                TreeNode::Leaf { negative, positive } => {
                    let like_probability = positive / (negative + positive);
                    return Prediction {
                        liked: like_probability > DECISION_THRESHOLD,
                        like_probability,
                    };
                }
            };
        }
    }
}

fn validate_node(node: &TreeNode) -> AppResult<()> {
    match node {
        TreeNode::Leaf { negative, positive } => {
            let valid = negative.is_finite()
                && positive.is_finite()
                && *negative >= 0.0
                && *positive >= 0.0
                && negative + positive > 0.0;
            if valid {
                Ok(())
            } else {
                Err(AppError::Classifier(format!(
                    "Leaf weights must be non-negative with a positive sum, got {}/{}",
                    negative, positive
                )))
            }
        }
        TreeNode::Category { matched, otherwise, .. } => {
            validate_node(matched)?;
            validate_node(otherwise)
        }
        TreeNode::Threshold {
            threshold,
            left,
            right,
            ..
        } => {
            if !threshold.is_finite() {
                return Err(AppError::Classifier("Threshold must be finite".to_string()));
            }
            validate_node(left)?;
            validate_node(right)
        }
    }
}

impl Classifier for DecisionTreeClassifier {
    fn predict(&self, rows: &[CandidateRow]) -> AppResult<Vec<Prediction>> {
        Ok(rows.iter().map(|row| self.predict_row(row)).collect())
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            model_type: self.model_type.clone(),
            feature_names: self.features.clone(),
            trained_on: self.trained_on,
        }
    }
}
