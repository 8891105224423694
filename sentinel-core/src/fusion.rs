//! Voting Fusion Engine
//!
//! Converts the three model votes into a severity/label pair. Pure and
//! total: every vote triple maps to exactly one row of the table, and the
//! sentinel constructors cover the degraded and error states, so callers
//! always receive a well-formed result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::ModelVerdict;

// Labels are part of the external contract; downstream consumers match on
// them verbatim.
pub const LABEL_CONFIRMED_INTRUSION: &str = "Confirmed Intrusion";
pub const LABEL_SUSPECTED_ANOMALY: &str = "Suspected Anomaly";
pub const LABEL_NORMAL_TRAFFIC: &str = "Normal Traffic";
pub const LABEL_DEMO_MODE: &str = "Demo Mode - Models Not Loaded";
pub const LABEL_INFERENCE_ERROR: &str = "Inference Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Severities that trigger external notification
    pub fn is_alertable(&self) -> bool {
        *self >= Severity::Medium
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            "CRITICAL" => Ok(Severity::Critical),
            _ => Err(()),
        }
    }
}

/// The fused ensemble verdict for one inference call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub severity: Severity,
    pub label: String,
    pub vote_count: u8,
    pub isolation_forest_score: f64,
    pub autoencoder_error: f64,
}

impl FusionResult {
    /// Sentinel returned whenever any model artifact failed to load.
    ///
    /// The values are fixed; downstream consumers rely on them.
    pub fn demo_mode() -> Self {
        Self {
            severity: Severity::Medium,
            label: LABEL_DEMO_MODE.to_string(),
            vote_count: 0,
            isolation_forest_score: -0.3,
            autoencoder_error: 0.03,
        }
    }

    /// Sentinel returned when scoring faults internally. The fault itself
    /// is only observable through logs.
    pub fn inference_error() -> Self {
        Self {
            severity: Severity::Medium,
            label: LABEL_INFERENCE_ERROR.to_string(),
            vote_count: 0,
            isolation_forest_score: 0.0,
            autoencoder_error: 0.0,
        }
    }
}

/// Map the three votes to a severity/label pair.
///
/// | votes | severity                       | label               |
/// |-------|--------------------------------|---------------------|
/// | >= 2  | CRITICAL                       | Confirmed Intrusion |
/// | 1     | MEDIUM if the autoencoder cast | Suspected Anomaly   |
/// |       | the vote, else HIGH            |                     |
/// | 0     | LOW                            | Normal Traffic      |
pub fn fuse(
    isolation_forest_vote: bool,
    autoencoder_vote: bool,
    classifier_vote: bool,
) -> (Severity, &'static str) {
    let votes = [isolation_forest_vote, autoencoder_vote, classifier_vote]
        .iter()
        .filter(|&&v| v)
        .count();

    match votes {
        v if v >= 2 => (Severity::Critical, LABEL_CONFIRMED_INTRUSION),
        1 => {
            // The autoencoder alone is treated as lower confidence than a
            // single vote from either other model.
            let severity = if autoencoder_vote {
                Severity::Medium
            } else {
                Severity::High
            };
            (severity, LABEL_SUSPECTED_ANOMALY)
        }
        _ => (Severity::Low, LABEL_NORMAL_TRAFFIC),
    }
}

/// Fuse a full verdict set into a result carrying the reportable raw scores.
pub fn fuse_verdicts(
    isolation_forest: &ModelVerdict,
    autoencoder: &ModelVerdict,
    classifier: &ModelVerdict,
) -> FusionResult {
    let (severity, label) = fuse(isolation_forest.vote, autoencoder.vote, classifier.vote);
    let vote_count = [isolation_forest.vote, autoencoder.vote, classifier.vote]
        .iter()
        .filter(|&&v| v)
        .count() as u8;

    FusionResult {
        severity,
        label: label.to_string(),
        vote_count,
        isolation_forest_score: isolation_forest.raw_score,
        autoencoder_error: autoencoder.raw_score,
    }
}

// ============================================================================
// TESTS
// ============================================================================
