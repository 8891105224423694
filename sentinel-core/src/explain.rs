//! Attribution Engine - per-feature explanations for the anomaly model
//!
//! Tree-path attribution over the isolation forest: walking each tree from
//! root to leaf, the expected-score delta at every split is credited to the
//! split feature. Averaged over trees this is additive by construction:
//!
//!   base_value + sum(contributions) == score_samples(x)
//!
//! which makes a single prediction decomposable feature by feature.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::features::{FeatureVector, NormalizedVector, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::models::IsolationForest;

/// One feature's contribution to a single prediction, paired with the raw
/// (unscaled) input value for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAttribution {
    pub feature: String,
    pub shap_value: f64,
    pub feature_value: f64,
}

/// Full explanation for one prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    /// Sorted by descending |shap_value|
    pub feature_importance: Vec<FeatureAttribution>,
    pub base_value: f64,
}

/// Explainer bound to a loaded isolation forest.
///
/// Construction fails unless every node in every tree carries an expected
/// score; without internal values the path deltas cannot be computed.
#[derive(Debug, Clone)]
pub struct TreeExplainer {
    forest: Arc<IsolationForest>,
    expected_value: f64,
}

impl TreeExplainer {
    pub fn try_new(forest: Arc<IsolationForest>) -> PipelineResult<Self> {
        if forest.trees().iter().any(|t| !t.all_values_present()) {
            return Err(PipelineError::Artifact(
                "isolation forest artifact lacks node values; explainer disabled".to_string(),
            ));
        }

        let expected_value = forest
            .trees()
            .iter()
            .map(|t| t.root_value().unwrap_or(0.0))
            .sum::<f64>()
            / forest.trees().len() as f64;

        Ok(Self {
            forest,
            expected_value,
        })
    }

    /// The model's expected score over the training distribution.
    pub fn expected_value(&self) -> f64 {
        self.expected_value
    }

    /// Explain one prediction.
    ///
    /// `normalized` is what the model actually scored; `raw` supplies the
    /// human-readable feature values for the report.
    pub fn explain(
        &self,
        normalized: &NormalizedVector,
        raw: &FeatureVector,
    ) -> PipelineResult<Explanation> {
        let mut contributions = vec![0.0f64; FEATURE_COUNT];
        for tree in self.forest.trees() {
            tree.path_contributions(normalized.as_slice(), &mut contributions)?;
        }

        let tree_count = self.forest.trees().len() as f64;
        let mut feature_importance: Vec<FeatureAttribution> = FEATURE_LAYOUT
            .iter()
            .enumerate()
            .map(|(index, &name)| FeatureAttribution {
                feature: name.to_string(),
                shap_value: contributions[index] / tree_count,
                feature_value: raw.get(index).unwrap_or(0.0),
            })
            .collect();

        // Most influential first
        feature_importance.sort_by(|a, b| {
            b.shap_value
                .abs()
                .partial_cmp(&a.shap_value.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(Explanation {
            feature_importance,
            base_value: self.expected_value,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::models::isolation_forest::IsolationForestArtifact;
    use crate::models::tree::{DecisionTree, TreeNode};
    use crate::scaler::Scaler;

    fn depth_two_tree(f0: usize, f1: usize) -> DecisionTree {
        // Root splits on f0, both children split on f1; leaf values spread
        // so the two features get distinct contributions.
        DecisionTree {
            nodes: vec![
                TreeNode {
                    feature: Some(f0),
                    threshold: 0.0,
                    left: 1,
                    right: 2,
                    value: Some(-0.5),
                },
                TreeNode {
                    feature: Some(f1),
                    threshold: 0.0,
                    left: 3,
                    right: 4,
                    value: Some(-0.7),
                },
                TreeNode {
                    feature: Some(f1),
                    threshold: 0.0,
                    left: 5,
                    right: 6,
                    value: Some(-0.3),
                },
                TreeNode { feature: None, threshold: 0.0, left: 0, right: 0, value: Some(-0.9) },
                TreeNode { feature: None, threshold: 0.0, left: 0, right: 0, value: Some(-0.6) },
                TreeNode { feature: None, threshold: 0.0, left: 0, right: 0, value: Some(-0.4) },
                TreeNode { feature: None, threshold: 0.0, left: 0, right: 0, value: Some(-0.1) },
            ],
        }
    }

    fn forest() -> Arc<IsolationForest> {
        Arc::new(
            IsolationForest::from_artifact(IsolationForestArtifact {
                trees: vec![depth_two_tree(0, 1), depth_two_tree(1, 2), depth_two_tree(0, 3)],
            })
            .unwrap(),
        )
    }

    fn identity_scaler() -> Scaler {
        Scaler::from_params(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]).unwrap()
    }

    #[test]
    fn test_additivity() {
        let forest = forest();
        let explainer = TreeExplainer::try_new(forest.clone()).unwrap();
        let scaler = identity_scaler();

        let mut values = vec![0.0; FEATURE_COUNT];
        values[0] = 1.0;
        values[1] = -1.0;
        let raw = FeatureVector::from_values(values).unwrap();
        let normalized = scaler.transform(&raw);

        let explanation = explainer.explain(&normalized, &raw).unwrap();
        let total: f64 = explanation
            .feature_importance
            .iter()
            .map(|f| f.shap_value)
            .sum();
        let score = forest.score_samples(normalized.as_slice()).unwrap();

        assert!((explanation.base_value + total - score).abs() < 1e-9);
    }

    #[test]
    fn test_additivity_over_random_vectors() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let forest = forest();
        let explainer = TreeExplainer::try_new(forest.clone()).unwrap();
        let scaler = identity_scaler();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let values: Vec<f64> = (0..FEATURE_COUNT).map(|_| rng.gen_range(-2.0..2.0)).collect();
            let raw = FeatureVector::from_values(values).unwrap();
            let normalized = scaler.transform(&raw);

            let explanation = explainer.explain(&normalized, &raw).unwrap();
            let total: f64 = explanation
                .feature_importance
                .iter()
                .map(|f| f.shap_value)
                .sum();
            let score = forest.score_samples(normalized.as_slice()).unwrap();

            assert!(
                (explanation.base_value + total - score).abs() < 1e-9,
                "additivity violated: base {} + total {} != score {}",
                explanation.base_value,
                total,
                score
            );
        }
    }

    #[test]
    fn test_sorted_by_absolute_contribution() {
        let explainer = TreeExplainer::try_new(forest()).unwrap();
        let scaler = identity_scaler();

        let mut values = vec![0.0; FEATURE_COUNT];
        values[0] = 2.0;
        values[2] = -3.0;
        let raw = FeatureVector::from_values(values).unwrap();
        let explanation = explainer.explain(&scaler.transform(&raw), &raw).unwrap();

        for pair in explanation.feature_importance.windows(2) {
            assert!(
                pair[0].shap_value.abs() >= pair[1].shap_value.abs(),
                "not sorted: {} before {}",
                pair[0].shap_value,
                pair[1].shap_value
            );
        }
        assert_eq!(explanation.feature_importance.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_reports_raw_feature_values() {
        let explainer = TreeExplainer::try_new(forest()).unwrap();
        // Non-identity scaler: reported values must be the raw inputs
        let scaler =
            Scaler::from_params(vec![10.0; FEATURE_COUNT], vec![2.0; FEATURE_COUNT]).unwrap();

        let mut values = vec![10.0; FEATURE_COUNT];
        values[0] = 42.0;
        let raw = FeatureVector::from_values(values).unwrap();
        let explanation = explainer.explain(&scaler.transform(&raw), &raw).unwrap();

        let entry = explanation
            .feature_importance
            .iter()
            .find(|f| f.feature == "Destination Port")
            .unwrap();
        assert_eq!(entry.feature_value, 42.0);
    }

    #[test]
    fn test_requires_node_values() {
        let forest = Arc::new(
            IsolationForest::from_artifact(IsolationForestArtifact {
                trees: vec![DecisionTree {
                    nodes: vec![
                        TreeNode {
                            feature: Some(0),
                            threshold: 0.0,
                            left: 1,
                            right: 2,
                            value: None, // no internal value
                        },
                        TreeNode { feature: None, threshold: 0.0, left: 0, right: 0, value: Some(-0.9) },
                        TreeNode { feature: None, threshold: 0.0, left: 0, right: 0, value: Some(-0.1) },
                    ],
                }],
            })
            .unwrap(),
        );
        assert!(TreeExplainer::try_new(forest).is_err());
    }
}
