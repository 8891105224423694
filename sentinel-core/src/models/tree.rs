//! Decision-tree ensemble representation
//!
//! Shared by the isolation-forest and gradient-boosted adapters. Trees are
//! loaded from JSON artifacts as flat node arrays; children always have a
//! larger index than their parent, so traversal terminates by construction.
//!
//! Every node may carry an expected-score `value`. Leaves must carry one
//! (it IS the tree's output); internal values are optional and only needed
//! by the attribution engine, which credits the root-to-leaf value deltas
//! to the split features.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// Split feature index; `None` marks a leaf
    #[serde(default)]
    pub feature: Option<usize>,
    /// Split threshold: `x[feature] <= threshold` routes left
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub left: usize,
    #[serde(default)]
    pub right: usize,
    /// Expected score at this node (required for leaves)
    #[serde(default)]
    pub value: Option<f64>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.feature.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Structural validation of a deserialized tree.
    ///
    /// Checks child indices (in range, strictly increasing so traversal
    /// cannot loop) and that every leaf carries a value. Split feature
    /// indices are checked against the input at scoring time, keeping the
    /// tree representation independent of any one schema.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.nodes.is_empty() {
            return Err(PipelineError::Artifact("tree has no nodes".to_string()));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                if node.value.is_none() {
                    return Err(PipelineError::Artifact(format!(
                        "leaf node {} has no value",
                        index
                    )));
                }
            } else {
                for child in [node.left, node.right] {
                    if child <= index || child >= self.nodes.len() {
                        return Err(PipelineError::Artifact(format!(
                            "node {} has out-of-order child {}",
                            index, child
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Route a sample to its leaf and return the leaf value.
    pub fn leaf_value(&self, sample: &[f64]) -> PipelineResult<f64> {
        let leaf = self.walk(sample, |_, _| {})?;
        leaf.value
            .ok_or_else(|| PipelineError::Inference("leaf node has no value".to_string()))
    }

    /// Route a sample to its leaf, crediting each step's value delta to the
    /// parent's split feature. Returns the leaf value. Requires every node
    /// on the path to carry a value.
    pub fn path_contributions(
        &self,
        sample: &[f64],
        contributions: &mut [f64],
    ) -> PipelineResult<f64> {
        let mut missing_value = false;
        let leaf = self.walk(sample, |parent: &TreeNode, child: &TreeNode| {
            match (parent.value, child.value, parent.feature) {
                (Some(pv), Some(cv), Some(feature)) => {
                    if let Some(slot) = contributions.get_mut(feature) {
                        *slot += cv - pv;
                    }
                }
                _ => missing_value = true,
            }
        })?;
        if missing_value {
            return Err(PipelineError::Inference(
                "tree path is missing node values".to_string(),
            ));
        }
        leaf.value
            .ok_or_else(|| PipelineError::Inference("leaf node has no value".to_string()))
    }

    /// Expected score at the root, if recorded.
    pub fn root_value(&self) -> Option<f64> {
        self.nodes.first().and_then(|n| n.value)
    }

    /// Whether every node (internal and leaf) carries a value.
    pub fn all_values_present(&self) -> bool {
        self.nodes.iter().all(|n| n.value.is_some())
    }

    fn walk<F>(&self, sample: &[f64], mut on_step: F) -> PipelineResult<&TreeNode>
    where
        F: FnMut(&TreeNode, &TreeNode),
    {
        let mut node = self
            .nodes
            .first()
            .ok_or_else(|| PipelineError::Inference("tree has no nodes".to_string()))?;

        while let Some(feature) = node.feature {
            let value = *sample.get(feature).ok_or_else(|| {
                PipelineError::Inference(format!(
                    "split feature {} out of range for {}-dim input",
                    feature,
                    sample.len()
                ))
            })?;
            let next_index = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            let next = self.nodes.get(next_index).ok_or_else(|| {
                PipelineError::Inference(format!("child index {} out of range", next_index))
            })?;
            on_step(node, next);
            node = next;
        }
        Ok(node)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Single stump: x[0] <= 0.5 ? -0.9 : -0.2, root expected -0.55
    pub(crate) fn stump(feature: usize) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode {
                    feature: Some(feature),
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                    value: Some(-0.55),
                },
                TreeNode {
                    feature: None,
                    threshold: 0.0,
                    left: 0,
                    right: 0,
                    value: Some(-0.9),
                },
                TreeNode {
                    feature: None,
                    threshold: 0.0,
                    left: 0,
                    right: 0,
                    value: Some(-0.2),
                },
            ],
        }
    }

    #[test]
    fn test_leaf_routing() {
        let tree = stump(0);
        assert_eq!(tree.leaf_value(&[0.0, 1.0]).unwrap(), -0.9);
        assert_eq!(tree.leaf_value(&[1.0, 1.0]).unwrap(), -0.2);
        // Boundary routes left
        assert_eq!(tree.leaf_value(&[0.5, 1.0]).unwrap(), -0.9);
    }

    #[test]
    fn test_path_contributions_are_additive() {
        let tree = stump(1);
        let mut contributions = vec![0.0; 4];
        let leaf = tree
            .path_contributions(&[0.0, 2.0, 0.0, 0.0], &mut contributions)
            .unwrap();
        assert_eq!(leaf, -0.2);
        // root value + contribution == leaf value
        assert!((tree.root_value().unwrap() + contributions[1] - leaf).abs() < 1e-12);
        assert_eq!(contributions[0], 0.0);
    }

    #[test]
    fn test_out_of_range_feature_fails_at_scoring() {
        let tree = stump(10);
        assert!(tree.validate().is_ok());
        assert!(matches!(
            tree.leaf_value(&[0.0, 0.0]),
            Err(PipelineError::Inference(_))
        ));
    }

    #[test]
    fn test_validate_rejects_valueless_leaf() {
        let tree = DecisionTree {
            nodes: vec![TreeNode {
                feature: None,
                threshold: 0.0,
                left: 0,
                right: 0,
                value: None,
            }],
        };
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let tree = DecisionTree {
            nodes: vec![
                TreeNode {
                    feature: Some(0),
                    threshold: 0.0,
                    left: 0, // points at itself
                    right: 1,
                    value: None,
                },
                TreeNode {
                    feature: None,
                    threshold: 0.0,
                    left: 0,
                    right: 0,
                    value: Some(1.0),
                },
            ],
        };
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let tree = stump(0);
        let json = serde_json::to_string(&tree).unwrap();
        let parsed: DecisionTree = serde_json::from_str(&json).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.leaf_value(&[0.0]).unwrap(), -0.9);
    }
}
