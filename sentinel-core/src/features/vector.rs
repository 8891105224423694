//! Feature Vector - parsing and validation of flow feature input
//!
//! Callers submit features as a comma-delimited numeric string in exact
//! schema order (see `layout.rs`). Parsing rejects wrong arity and
//! non-numeric or non-finite tokens before anything reaches a model.

use serde::{Deserialize, Serialize};

use super::layout::{feature_name, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
use crate::error::{PipelineError, PipelineResult};

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// A validated feature vector bound to the current layout.
///
/// Invariant: `values.len() == FEATURE_COUNT` and every value is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version the values were validated against
    pub version: u8,
    /// Feature values in `FEATURE_LAYOUT` order
    values: Vec<f64>,
}

impl FeatureVector {
    /// Parse a comma-delimited numeric string into a feature vector.
    ///
    /// Tokens are trimmed before parsing. Input order is assumed to already
    /// match the schema; no reordering is performed.
    pub fn parse(input: &str) -> PipelineResult<Self> {
        let tokens: Vec<&str> = input.split(',').collect();
        if tokens.len() != FEATURE_COUNT {
            return Err(PipelineError::count_mismatch(tokens.len()));
        }

        let mut values = Vec::with_capacity(FEATURE_COUNT);
        for (index, token) in tokens.iter().enumerate() {
            let trimmed = token.trim();
            let value: f64 =
                trimmed
                    .parse()
                    .map_err(|_| PipelineError::FeatureParseError {
                        index,
                        token: trimmed.to_string(),
                    })?;
            if !value.is_finite() {
                return Err(PipelineError::FeatureParseError {
                    index,
                    token: trimmed.to_string(),
                });
            }
            values.push(value);
        }

        Ok(Self {
            version: FEATURE_VERSION,
            values,
        })
    }

    /// Build from already-validated values (length is still checked).
    pub fn from_values(values: Vec<f64>) -> PipelineResult<Self> {
        if values.len() != FEATURE_COUNT {
            return Err(PipelineError::count_mismatch(values.len()));
        }
        Ok(Self {
            version: FEATURE_VERSION,
            values,
        })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Iterate `(feature_name, value)` pairs in schema order.
    pub fn named_values(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_LAYOUT
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}

// ============================================================================
// NORMALIZED VECTOR
// ============================================================================

/// A feature vector after the scaler transform.
///
/// Same cardinality and order as [`FeatureVector`]; values carry no further
/// semantic constraints (they may be negative or non-finite only if the
/// scaler parameters are degenerate, which artifact validation prevents).
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedVector(Vec<f64>);

impl NormalizedVector {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), FEATURE_COUNT);
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn feature_name(index: usize) -> Option<&'static str> {
        feature_name(index)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_of(n: usize) -> String {
        (0..n)
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_parse_valid() {
        let vector = FeatureVector::parse(&csv_of(FEATURE_COUNT)).unwrap();
        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
        assert_eq!(vector.get(0), Some(0.0));
        assert_eq!(vector.get(49), Some(49.0));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let input = (0..FEATURE_COUNT)
            .map(|i| format!(" {} ", i))
            .collect::<Vec<_>>()
            .join(",");
        let vector = FeatureVector::parse(&input).unwrap();
        assert_eq!(vector.get(1), Some(1.0));
    }

    #[test]
    fn test_parse_too_few() {
        let err = FeatureVector::parse(&csv_of(49)).unwrap_err();
        match err {
            PipelineError::FeatureCountMismatch { expected, got } => {
                assert_eq!(expected, 50);
                assert_eq!(got, 49);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_too_many() {
        let err = FeatureVector::parse(&csv_of(51)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FeatureCountMismatch { got: 51, .. }
        ));
    }

    #[test]
    fn test_parse_bad_token() {
        let mut tokens: Vec<String> = (0..FEATURE_COUNT).map(|i| i.to_string()).collect();
        tokens[2] = "abc".to_string();
        let err = FeatureVector::parse(&tokens.join(",")).unwrap_err();
        match err {
            PipelineError::FeatureParseError { index, token } => {
                assert_eq!(index, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        for bad in ["NaN", "inf", "-inf"] {
            let mut tokens: Vec<String> = (0..FEATURE_COUNT).map(|i| i.to_string()).collect();
            tokens[10] = bad.to_string();
            let err = FeatureVector::parse(&tokens.join(",")).unwrap_err();
            assert!(
                matches!(err, PipelineError::FeatureParseError { index: 10, .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_named_values_order() {
        let vector = FeatureVector::parse(&csv_of(FEATURE_COUNT)).unwrap();
        let first = vector.named_values().next().unwrap();
        assert_eq!(first, ("Destination Port", 0.0));
    }

    #[test]
    fn test_from_values_wrong_len() {
        assert!(FeatureVector::from_values(vec![0.0; 10]).is_err());
    }
}
