//! Model adapters - uniform scoring over heterogeneous artifacts
//!
//! Each adapter wraps one pre-trained artifact and exposes the same
//! capability: score a normalized vector, returning the model's raw signal
//! and its binary anomaly vote. All three run unconditionally on every
//! inference call; there is no short-circuiting.

pub mod autoencoder;
pub mod classifier;
pub mod isolation_forest;
pub mod tree;

use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;
use crate::features::NormalizedVector;

pub use autoencoder::Autoencoder;
pub use classifier::GradientBoostedClassifier;
pub use isolation_forest::IsolationForest;

/// Identifies which ensemble member produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    IsolationForest,
    Autoencoder,
    Classifier,
}

impl ModelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::IsolationForest => "isolation_forest",
            ModelId::Autoencoder => "autoencoder",
            ModelId::Classifier => "classifier",
        }
    }
}

/// A model's raw signal plus its thresholded vote
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    pub raw: f64,
    pub vote: bool,
}

/// One ensemble member's verdict for a single inference call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelVerdict {
    pub model_id: ModelId,
    pub raw_score: f64,
    pub vote: bool,
}

impl ModelVerdict {
    pub fn new(model_id: ModelId, score: ScoreResult) -> Self {
        Self {
            model_id,
            raw_score: score.raw,
            vote: score.vote,
        }
    }
}

/// Uniform scoring capability implemented by all three adapters
pub trait ModelScorer {
    fn id(&self) -> ModelId;

    fn score(&self, input: &NormalizedVector) -> PipelineResult<ScoreResult>;

    fn verdict(&self, input: &NormalizedVector) -> PipelineResult<ModelVerdict> {
        Ok(ModelVerdict::new(self.id(), self.score(input)?))
    }
}
