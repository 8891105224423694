//! Isolation Forest adapter
//!
//! The artifact stores the fitted trees with per-node expected scores; a
//! sample's score is the mean leaf value over all trees, matching the
//! score_samples convention (higher = more normal, anomalies trend
//! negative).

use serde::Deserialize;

use super::tree::DecisionTree;
use super::{ModelId, ModelScorer, ScoreResult};
use crate::error::{PipelineError, PipelineResult};
use crate::features::NormalizedVector;

/// Vote threshold on the raw anomaly score
pub const ANOMALY_SCORE_THRESHOLD: f64 = -0.5;

#[derive(Debug, Clone, Deserialize)]
pub struct IsolationForestArtifact {
    pub trees: Vec<DecisionTree>,
}

#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<DecisionTree>,
}

impl IsolationForest {
    pub fn from_artifact(artifact: IsolationForestArtifact) -> PipelineResult<Self> {
        if artifact.trees.is_empty() {
            return Err(PipelineError::Artifact(
                "isolation forest has no trees".to_string(),
            ));
        }
        for tree in &artifact.trees {
            tree.validate()?;
        }
        Ok(Self {
            trees: artifact.trees,
        })
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean leaf value over all trees (lower = more anomalous).
    pub fn score_samples(&self, sample: &[f64]) -> PipelineResult<f64> {
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.leaf_value(sample)?;
        }
        Ok(sum / self.trees.len() as f64)
    }
}

impl ModelScorer for IsolationForest {
    fn id(&self) -> ModelId {
        ModelId::IsolationForest
    }

    fn score(&self, input: &NormalizedVector) -> PipelineResult<ScoreResult> {
        let raw = self.score_samples(input.as_slice())?;
        Ok(ScoreResult {
            raw,
            vote: raw < ANOMALY_SCORE_THRESHOLD,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
