//! Pipeline Orchestrator
//!
//! Wires parser → scaler → the three adapters → fusion, and separately
//! parser → scaler → attribution. The fusion path has an "always answer"
//! contract: past feature validation it never raises, converting internal
//! faults to a fixed sentinel and reporting the cause through logs only.

use std::sync::Arc;

use crate::error::{PipelineError, PipelineResult};
use crate::explain::Explanation;
use crate::features::FeatureVector;
use crate::fusion::{fuse_verdicts, FusionResult};
use crate::models::ModelScorer;
use crate::registry::ModelRegistry;

#[derive(Debug, Clone)]
pub struct DetectionPipeline {
    registry: Arc<ModelRegistry>,
}

impl DetectionPipeline {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Score a comma-delimited feature string through the full ensemble.
    ///
    /// Errors only for malformed input (count/token); everything else
    /// resolves to a well-formed [`FusionResult`]:
    /// - incomplete registry → demo-mode sentinel, before parsing
    /// - internal scoring fault → inference-error sentinel (fault logged)
    pub fn run_inference(&self, features: &str) -> PipelineResult<FusionResult> {
        if !self.registry.is_fully_operational() {
            return Ok(FusionResult::demo_mode());
        }

        let vector = FeatureVector::parse(features)?;

        match self.score(&vector) {
            Ok(result) => {
                log::debug!(
                    "ensemble verdict: {} ({}, {} votes)",
                    result.label,
                    result.severity,
                    result.vote_count
                );
                Ok(result)
            }
            Err(e) => {
                log::error!("inference failed, returning sentinel verdict: {}", e);
                Ok(FusionResult::inference_error())
            }
        }
    }

    fn score(&self, vector: &FeatureVector) -> PipelineResult<FusionResult> {
        // Guarded by is_fully_operational, but never trust a flag over the
        // slots themselves.
        let scaler = self
            .registry
            .scaler()
            .ok_or(PipelineError::ModelsUnavailable("scaler"))?;
        let forest = self
            .registry
            .isolation_forest()
            .ok_or(PipelineError::ModelsUnavailable("isolation forest"))?;
        let autoencoder = self
            .registry
            .autoencoder()
            .ok_or(PipelineError::ModelsUnavailable("autoencoder"))?;
        let classifier = self
            .registry
            .classifier()
            .ok_or(PipelineError::ModelsUnavailable("classifier"))?;

        let normalized = scaler.transform(vector);

        // All three run unconditionally; no vote short-circuits another.
        let forest_verdict = forest.verdict(&normalized)?;
        let autoencoder_verdict = autoencoder.verdict(&normalized)?;
        let classifier_verdict = classifier.verdict(&normalized)?;

        Ok(fuse_verdicts(
            &forest_verdict,
            &autoencoder_verdict,
            &classifier_verdict,
        ))
    }

    /// Produce a per-feature attribution report for the anomaly model.
    ///
    /// Unlike inference there is no meaningful sentinel for a missing
    /// explanation, so registry gaps surface as `ModelsUnavailable`.
    pub fn explain(&self, features: &str) -> PipelineResult<Explanation> {
        let scaler = self
            .registry
            .scaler()
            .ok_or(PipelineError::ModelsUnavailable("scaler"))?;
        let explainer = self
            .registry
            .explainer()
            .ok_or(PipelineError::ModelsUnavailable("explainer"))?;

        let vector = FeatureVector::parse(features)?;
        let normalized = scaler.transform(&vector);
        explainer.explain(&normalized, &vector)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;
    use crate::fusion::Severity;
    use crate::models::autoencoder::{Activation, AutoencoderArtifact, LayerSpec};
    use crate::models::classifier::ClassifierArtifact;
    use crate::models::isolation_forest::IsolationForestArtifact;
    use crate::models::tree::{DecisionTree, TreeNode};
    use crate::models::{Autoencoder, GradientBoostedClassifier, IsolationForest};
    use crate::scaler::Scaler;

    fn stump(feature: usize, left_value: f64, right_value: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode {
                    feature: Some(feature),
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                    value: Some((left_value + right_value) / 2.0),
                },
                TreeNode {
                    feature: None,
                    threshold: 0.0,
                    left: 0,
                    right: 0,
                    value: Some(left_value),
                },
                TreeNode {
                    feature: None,
                    threshold: 0.0,
                    left: 0,
                    right: 0,
                    value: Some(right_value),
                },
            ],
        }
    }

    fn identity_scaler() -> Scaler {
        Scaler::from_params(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]).unwrap()
    }

    /// Registry tuned so an all-zero input scores IF -0.9 (vote), AE MSE
    /// 0.01 (no vote), classifier label 0 (no vote).
    fn scenario_registry() -> ModelRegistry {
        let forest = IsolationForest::from_artifact(IsolationForestArtifact {
            trees: vec![stump(0, -0.9, -0.2)],
        })
        .unwrap();

        let autoencoder = Autoencoder::from_artifact(AutoencoderArtifact {
            layers: vec![LayerSpec {
                weights: vec![vec![0.0; FEATURE_COUNT]; FEATURE_COUNT],
                bias: vec![0.1; FEATURE_COUNT],
                activation: Activation::Linear,
            }],
        })
        .unwrap();

        let classifier = GradientBoostedClassifier::from_artifact(ClassifierArtifact {
            base_score: -2.0,
            trees: vec![stump(0, 0.0, 4.0)],
        })
        .unwrap();

        ModelRegistry::from_parts(
            Some(identity_scaler()),
            Some(Arc::new(forest)),
            Some(autoencoder),
            Some(classifier),
        )
    }

    fn zeros_csv() -> String {
        vec!["0"; FEATURE_COUNT].join(",")
    }

    #[test]
    fn test_end_to_end_single_forest_vote_is_high() {
        let pipeline = DetectionPipeline::new(Arc::new(scenario_registry()));
        let result = pipeline.run_inference(&zeros_csv()).unwrap();

        assert_eq!(result.severity, Severity::High);
        assert_eq!(result.label, "Suspected Anomaly");
        assert_eq!(result.vote_count, 1);
        assert!((result.isolation_forest_score - (-0.9)).abs() < 1e-12);
        assert!((result.autoencoder_error - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_demo_mode_regardless_of_input() {
        let pipeline = DetectionPipeline::new(Arc::new(ModelRegistry::empty()));

        for input in [zeros_csv(), "not,even,numbers".to_string(), String::new()] {
            let result = pipeline.run_inference(&input).unwrap();
            assert_eq!(result, FusionResult::demo_mode());
        }
    }

    #[test]
    fn test_parse_errors_surface_when_operational() {
        let pipeline = DetectionPipeline::new(Arc::new(scenario_registry()));

        let err = pipeline.run_inference("1,2,3").unwrap_err();
        assert!(matches!(err, PipelineError::FeatureCountMismatch { .. }));

        let mut tokens = vec!["0".to_string(); FEATURE_COUNT];
        tokens[5] = "abc".to_string();
        let err = pipeline.run_inference(&tokens.join(",")).unwrap_err();
        assert!(matches!(err, PipelineError::FeatureParseError { .. }));
    }

    #[test]
    fn test_internal_fault_becomes_sentinel() {
        // Forest splits on a feature index the schema does not have, so
        // scoring faults after validation passed.
        let broken_forest = IsolationForest::from_artifact(IsolationForestArtifact {
            trees: vec![stump(999, -0.9, -0.2)],
        })
        .unwrap();

        let healthy = scenario_registry();
        let registry = ModelRegistry::from_parts(
            healthy.scaler().cloned(),
            Some(Arc::new(broken_forest)),
            healthy.autoencoder().cloned(),
            healthy.classifier().cloned(),
        );

        let pipeline = DetectionPipeline::new(Arc::new(registry));
        let result = pipeline.run_inference(&zeros_csv()).unwrap();
        assert_eq!(result, FusionResult::inference_error());
    }

    #[test]
    fn test_explain_requires_models() {
        let pipeline = DetectionPipeline::new(Arc::new(ModelRegistry::empty()));
        let err = pipeline.explain(&zeros_csv()).unwrap_err();
        assert!(matches!(err, PipelineError::ModelsUnavailable(_)));
    }

    #[test]
    fn test_explain_surfaces_parse_errors() {
        let pipeline = DetectionPipeline::new(Arc::new(scenario_registry()));
        let err = pipeline.explain("1,2,3").unwrap_err();
        assert!(matches!(err, PipelineError::FeatureCountMismatch { .. }));
    }

    #[test]
    fn test_explain_full_report() {
        let pipeline = DetectionPipeline::new(Arc::new(scenario_registry()));
        let explanation = pipeline.explain(&zeros_csv()).unwrap();

        assert_eq!(explanation.feature_importance.len(), FEATURE_COUNT);
        // The single stump splits on feature 0; all weight lands there.
        assert_eq!(explanation.feature_importance[0].feature, "Destination Port");
        assert!(explanation.feature_importance[0].shap_value.abs() > 0.0);
    }
}
