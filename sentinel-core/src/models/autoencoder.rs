//! Autoencoder adapter
//!
//! The artifact stores the dense layers of a feed-forward autoencoder
//! (50 → bottleneck → 50). Scoring runs the forward pass and reports the
//! mean squared reconstruction error over all features.
//!
//! Failure policy: if reconstruction fails for any reason the adapter
//! reports an error of 0.0 instead of propagating. Downstream consumers
//! depend on that fail-open default; the suppressed fault is emitted as a
//! structured warning so the silent failure stays observable.

use ndarray::{Array1, Array2};
use serde::Deserialize;

use super::{ModelId, ModelScorer, ScoreResult};
use crate::error::{PipelineError, PipelineResult};
use crate::features::{NormalizedVector, FEATURE_COUNT};

/// Vote threshold on the mean squared reconstruction error
pub const RECONSTRUCTION_ERROR_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Linear,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Linear => x,
        }
    }
}

/// One dense layer as stored in the artifact: `weights[input][output]`
#[derive(Debug, Clone, Deserialize)]
pub struct LayerSpec {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutoencoderArtifact {
    pub layers: Vec<LayerSpec>,
}

#[derive(Debug, Clone)]
struct DenseLayer {
    weights: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
}

impl DenseLayer {
    fn apply(&self, input: &Array1<f64>) -> PipelineResult<Array1<f64>> {
        if input.len() != self.weights.nrows() {
            return Err(PipelineError::Inference(format!(
                "layer expects {} inputs, got {}",
                self.weights.nrows(),
                input.len()
            )));
        }
        let mut output = input.dot(&self.weights) + &self.bias;
        output.mapv_inplace(|v| self.activation.apply(v));
        Ok(output)
    }
}

#[derive(Debug, Clone)]
pub struct Autoencoder {
    layers: Vec<DenseLayer>,
}

impl Autoencoder {
    /// Build from a deserialized artifact.
    ///
    /// Validates per-layer shapes and the outer 50-in/50-out contract.
    /// Layer-to-layer chaining is checked at reconstruction time.
    pub fn from_artifact(artifact: AutoencoderArtifact) -> PipelineResult<Self> {
        if artifact.layers.is_empty() {
            return Err(PipelineError::Artifact(
                "autoencoder has no layers".to_string(),
            ));
        }

        let mut layers = Vec::with_capacity(artifact.layers.len());
        for (index, spec) in artifact.layers.into_iter().enumerate() {
            let rows = spec.weights.len();
            let cols = spec.weights.first().map(|r| r.len()).unwrap_or(0);
            if rows == 0 || cols == 0 {
                return Err(PipelineError::Artifact(format!(
                    "layer {} has empty weight matrix",
                    index
                )));
            }
            if spec.weights.iter().any(|row| row.len() != cols) {
                return Err(PipelineError::Artifact(format!(
                    "layer {} has ragged weight rows",
                    index
                )));
            }
            if spec.bias.len() != cols {
                return Err(PipelineError::Artifact(format!(
                    "layer {} bias length {} does not match {} outputs",
                    index,
                    spec.bias.len(),
                    cols
                )));
            }

            let flat: Vec<f64> = spec.weights.into_iter().flatten().collect();
            let weights = Array2::from_shape_vec((rows, cols), flat)
                .map_err(|e| PipelineError::Artifact(format!("layer {}: {}", index, e)))?;
            layers.push(DenseLayer {
                weights,
                bias: Array1::from_vec(spec.bias),
                activation: spec.activation,
            });
        }

        let input_dim = layers[0].weights.nrows();
        let output_dim = layers[layers.len() - 1].weights.ncols();
        if input_dim != FEATURE_COUNT || output_dim != FEATURE_COUNT {
            return Err(PipelineError::Artifact(format!(
                "autoencoder must map {} -> {} features, got {} -> {}",
                FEATURE_COUNT, FEATURE_COUNT, input_dim, output_dim
            )));
        }

        Ok(Self { layers })
    }

    /// Run the forward pass, producing the reconstructed vector.
    pub fn reconstruct(&self, sample: &[f64]) -> PipelineResult<Vec<f64>> {
        let mut current = Array1::from_vec(sample.to_vec());
        for layer in &self.layers {
            current = layer.apply(&current)?;
        }
        Ok(current.to_vec())
    }

    /// Mean squared reconstruction error across all features.
    pub fn reconstruction_error(&self, sample: &[f64]) -> PipelineResult<f64> {
        let reconstructed = self.reconstruct(sample)?;
        let sum: f64 = sample
            .iter()
            .zip(reconstructed.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        Ok(sum / sample.len() as f64)
    }
}

impl ModelScorer for Autoencoder {
    fn id(&self) -> ModelId {
        ModelId::Autoencoder
    }

    fn score(&self, input: &NormalizedVector) -> PipelineResult<ScoreResult> {
        let raw = match self.reconstruction_error(input.as_slice()) {
            Ok(mse) => mse,
            Err(e) => {
                // Known weakness: fail-open default kept for downstream
                // compatibility. Observable only through this log line.
                log::warn!("autoencoder reconstruction failed, reporting 0.0: {}", e);
                0.0
            }
        };
        Ok(ScoreResult {
            raw,
            vote: raw > RECONSTRUCTION_ERROR_THRESHOLD,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
