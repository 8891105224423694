//! Pipeline error taxonomy

use thiserror::Error;

use crate::features::layout::FEATURE_COUNT;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors surfaced by the inference and explain entry points.
///
/// The fusion path converts `Inference` faults to a sentinel result at its
/// boundary; only feature validation errors escape it. The explain path
/// additionally surfaces `ModelsUnavailable`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("feature count mismatch: expected {expected}, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    #[error("invalid feature value at position {index}: {token:?}")]
    FeatureParseError { index: usize, token: String },

    #[error("models unavailable: {0}")]
    ModelsUnavailable(&'static str),

    #[error("artifact error: {0}")]
    Artifact(String),

    #[error("inference failure: {0}")]
    Inference(String),
}

impl PipelineError {
    pub fn count_mismatch(got: usize) -> Self {
        Self::FeatureCountMismatch {
            expected: FEATURE_COUNT,
            got,
        }
    }

    /// True for malformed caller input (4xx-equivalent), false for
    /// internal/operational faults.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::FeatureCountMismatch { .. } | Self::FeatureParseError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(PipelineError::count_mismatch(49).is_validation());
        assert!(PipelineError::FeatureParseError {
            index: 2,
            token: "abc".to_string()
        }
        .is_validation());
        assert!(!PipelineError::ModelsUnavailable("scaler").is_validation());
        assert!(!PipelineError::Inference("boom".to_string()).is_validation());
    }

    #[test]
    fn test_display_includes_positions() {
        let err = PipelineError::count_mismatch(51);
        assert!(err.to_string().contains("expected 50"));
        assert!(err.to_string().contains("got 51"));

        let err = PipelineError::FeatureParseError {
            index: 7,
            token: "x".to_string(),
        };
        assert!(err.to_string().contains("position 7"));
    }
}
