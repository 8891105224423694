//! Scaler - pre-fitted affine feature normalization
//!
//! Parameters come from the training pipeline (one `(center, scale)` pair
//! per feature) and are loaded once at startup. The transform is pure and
//! deterministic: `output = (input - center) / scale`.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::features::{FeatureVector, NormalizedVector, FEATURE_COUNT};

/// Denominator floor so a degenerate scale entry cannot produce inf/NaN
const MIN_SCALE: f64 = 1e-12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    center: Vec<f64>,
    scale: Vec<f64>,
}

impl Scaler {
    pub fn from_params(center: Vec<f64>, scale: Vec<f64>) -> PipelineResult<Self> {
        if center.len() != FEATURE_COUNT || scale.len() != FEATURE_COUNT {
            return Err(PipelineError::Artifact(format!(
                "scaler expects {} (center, scale) pairs, got {}/{}",
                FEATURE_COUNT,
                center.len(),
                scale.len()
            )));
        }
        if center.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(PipelineError::Artifact(
                "scaler parameters must be finite".to_string(),
            ));
        }
        Ok(Self { center, scale })
    }

    /// Validate a deserialized artifact (serde cannot check lengths).
    pub fn validated(self) -> PipelineResult<Self> {
        Self::from_params(self.center, self.scale)
    }

    pub fn transform(&self, input: &FeatureVector) -> NormalizedVector {
        let values = input
            .as_slice()
            .iter()
            .zip(self.center.iter().zip(self.scale.iter()))
            .map(|(&v, (&c, &s))| (v - c) / denominator(s))
            .collect();
        NormalizedVector::new(values)
    }

    /// Inverse of [`transform`]; used to sanity-check fitted parameters.
    pub fn inverse_transform(&self, input: &NormalizedVector) -> FeatureVector {
        let values: Vec<f64> = input
            .as_slice()
            .iter()
            .zip(self.center.iter().zip(self.scale.iter()))
            .map(|(&v, (&c, &s))| v * denominator(s) + c)
            .collect();
        // Length is preserved by construction
        FeatureVector::from_values(values).expect("inverse transform preserves arity")
    }
}

fn denominator(scale: f64) -> f64 {
    if scale.abs() < MIN_SCALE {
        MIN_SCALE
    } else {
        scale
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_scaler() -> Scaler {
        let center: Vec<f64> = (0..FEATURE_COUNT).map(|i| i as f64 * 0.5).collect();
        let scale: Vec<f64> = (0..FEATURE_COUNT).map(|i| 1.0 + i as f64 * 0.1).collect();
        Scaler::from_params(center, scale).unwrap()
    }

    #[test]
    fn test_transform_centers_and_scales() {
        let scaler = Scaler::from_params(vec![1.0; FEATURE_COUNT], vec![2.0; FEATURE_COUNT])
            .unwrap();
        let input = FeatureVector::from_values(vec![5.0; FEATURE_COUNT]).unwrap();
        let normalized = scaler.transform(&input);
        for &v in normalized.as_slice() {
            assert!((v - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_round_trip_is_identity() {
        let scaler = test_scaler();
        let input =
            FeatureVector::from_values((0..FEATURE_COUNT).map(|i| i as f64 * 3.7).collect())
                .unwrap();

        let round_tripped = scaler.inverse_transform(&scaler.transform(&input));
        for (a, b) in input.as_slice().iter().zip(round_tripped.as_slice()) {
            assert!((a - b).abs() < 1e-9, "{a} != {b}");
        }
    }

    #[test]
    fn test_zero_scale_does_not_blow_up() {
        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[0] = 0.0;
        let scaler = Scaler::from_params(vec![0.0; FEATURE_COUNT], scale).unwrap();
        let input = FeatureVector::from_values(vec![1.0; FEATURE_COUNT]).unwrap();
        let normalized = scaler.transform(&input);
        assert!(normalized.get(0).unwrap().is_finite());
    }

    #[test]
    fn test_wrong_arity_rejected() {
        assert!(Scaler::from_params(vec![0.0; 10], vec![1.0; 10]).is_err());
        assert!(Scaler::from_params(vec![0.0; FEATURE_COUNT], vec![1.0; 10]).is_err());
    }

    #[test]
    fn test_non_finite_params_rejected() {
        let mut center = vec![0.0; FEATURE_COUNT];
        center[5] = f64::NAN;
        assert!(Scaler::from_params(center, vec![1.0; FEATURE_COUNT]).is_err());
    }
}
