//! FlowSentinel core - ensemble inference and fusion pipeline
//!
//! Scores network-flow feature vectors with three independently trained
//! models (isolation forest, autoencoder, gradient-boosted classifier),
//! fuses the thresholded votes into a severity/label verdict, and produces
//! per-feature attributions for the anomaly model.
//!
//! The crate is synchronous and I/O-free apart from artifact loading; the
//! serving layer lives in `flowsentinel-server`.

pub mod error;
pub mod explain;
pub mod features;
pub mod fusion;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod scaler;

pub use error::{PipelineError, PipelineResult};
pub use explain::{Explanation, FeatureAttribution, TreeExplainer};
pub use features::{FeatureVector, NormalizedVector, FEATURE_COUNT, FEATURE_LAYOUT};
pub use fusion::{fuse, FusionResult, Severity};
pub use models::{ModelId, ModelScorer, ModelVerdict, ScoreResult};
pub use pipeline::DetectionPipeline;
pub use registry::{ModelRegistry, RegistryStatus};
pub use scaler::Scaler;
