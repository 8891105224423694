//! Gradient-boosted classifier adapter
//!
//! The artifact stores the boosted trees plus a base score. A sample's
//! margin is `base_score + sum(leaf values)`; the attack probability is the
//! logistic of the margin and the predicted label is its 0.5 cut.

use serde::Deserialize;

use super::tree::DecisionTree;
use super::{ModelId, ModelScorer, ScoreResult};
use crate::error::{PipelineError, PipelineResult};
use crate::features::NormalizedVector;

/// Class labels: 0 = normal traffic, 1 = attack
pub const LABEL_NORMAL: u8 = 0;
pub const LABEL_ATTACK: u8 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierArtifact {
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<DecisionTree>,
}

#[derive(Debug, Clone)]
pub struct GradientBoostedClassifier {
    base_score: f64,
    trees: Vec<DecisionTree>,
}

impl GradientBoostedClassifier {
    pub fn from_artifact(artifact: ClassifierArtifact) -> PipelineResult<Self> {
        if artifact.trees.is_empty() {
            return Err(PipelineError::Artifact(
                "classifier has no trees".to_string(),
            ));
        }
        for tree in &artifact.trees {
            tree.validate()?;
        }
        Ok(Self {
            base_score: artifact.base_score,
            trees: artifact.trees,
        })
    }

    /// Raw margin before the logistic link.
    pub fn decision_function(&self, sample: &[f64]) -> PipelineResult<f64> {
        let mut margin = self.base_score;
        for tree in &self.trees {
            margin += tree.leaf_value(sample)?;
        }
        Ok(margin)
    }

    /// Probability of the attack class.
    pub fn predict_probability(&self, sample: &[f64]) -> PipelineResult<f64> {
        let margin = self.decision_function(sample)?;
        Ok(1.0 / (1.0 + (-margin).exp()))
    }

    /// Predicted class label.
    pub fn predict(&self, sample: &[f64]) -> PipelineResult<u8> {
        let probability = self.predict_probability(sample)?;
        Ok(if probability > 0.5 {
            LABEL_ATTACK
        } else {
            LABEL_NORMAL
        })
    }
}

impl ModelScorer for GradientBoostedClassifier {
    fn id(&self) -> ModelId {
        ModelId::Classifier
    }

    fn score(&self, input: &NormalizedVector) -> PipelineResult<ScoreResult> {
        let label = self.predict(input.as_slice())?;
        Ok(ScoreResult {
            raw: f64::from(label),
            vote: label == LABEL_ATTACK,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
