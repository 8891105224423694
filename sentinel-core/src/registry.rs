//! Model Registry - best-effort artifact loading at startup
//!
//! Each artifact loads independently; a failure logs a warning and leaves
//! the slot empty instead of aborting startup. The registry is constructed
//! once, shared read-only behind an `Arc`, and never mutated afterward, so
//! concurrent inference needs no locking.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::explain::TreeExplainer;
use crate::features::{layout_hash, FEATURE_COUNT, FEATURE_VERSION};
use crate::models::autoencoder::AutoencoderArtifact;
use crate::models::classifier::ClassifierArtifact;
use crate::models::isolation_forest::IsolationForestArtifact;
use crate::models::{Autoencoder, GradientBoostedClassifier, IsolationForest};
use crate::scaler::Scaler;

pub const SCALER_FILE: &str = "scaler.json";
pub const ISOLATION_FOREST_FILE: &str = "isolation_forest.json";
pub const AUTOENCODER_FILE: &str = "autoencoder.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";

#[derive(Debug)]
pub struct ModelRegistry {
    scaler: Option<Scaler>,
    isolation_forest: Option<Arc<IsolationForest>>,
    autoencoder: Option<Autoencoder>,
    classifier: Option<GradientBoostedClassifier>,
    explainer: Option<TreeExplainer>,
    loaded_at: DateTime<Utc>,
}

impl ModelRegistry {
    /// Load all artifacts from a directory, best-effort.
    pub fn load(dir: &Path) -> Self {
        log::info!("loading model artifacts from {}", dir.display());

        let scaler = load_slot(dir, SCALER_FILE, |artifact: Scaler| artifact.validated());
        let isolation_forest = load_slot(
            dir,
            ISOLATION_FOREST_FILE,
            |artifact: IsolationForestArtifact| {
                IsolationForest::from_artifact(artifact).map(Arc::new)
            },
        );
        let autoencoder = load_slot(dir, AUTOENCODER_FILE, Autoencoder::from_artifact);
        let classifier = load_slot(
            dir,
            CLASSIFIER_FILE,
            GradientBoostedClassifier::from_artifact,
        );

        let registry = Self::from_parts(scaler, isolation_forest, autoencoder, classifier);
        if registry.is_fully_operational() {
            log::info!("all model artifacts loaded; pipeline fully operational");
        } else {
            log::warn!("some model artifacts are missing; running in demo mode");
        }
        registry
    }

    /// Assemble a registry from already-loaded parts.
    ///
    /// The explainer is derived from the isolation forest when its artifact
    /// carries the node values attribution needs.
    pub fn from_parts(
        scaler: Option<Scaler>,
        isolation_forest: Option<Arc<IsolationForest>>,
        autoencoder: Option<Autoencoder>,
        classifier: Option<GradientBoostedClassifier>,
    ) -> Self {
        let explainer = isolation_forest.as_ref().and_then(|forest| {
            match TreeExplainer::try_new(forest.clone()) {
                Ok(explainer) => Some(explainer),
                Err(e) => {
                    log::warn!("could not initialize explainer: {}", e);
                    None
                }
            }
        });

        Self {
            scaler,
            isolation_forest,
            autoencoder,
            classifier,
            explainer,
            loaded_at: Utc::now(),
        }
    }

    /// Registry with every slot empty (forces demo mode).
    pub fn empty() -> Self {
        Self::from_parts(None, None, None, None)
    }

    /// True when all four model artifacts are present. Read by every
    /// inference call; the explainer is tracked separately because the
    /// fusion path does not need it.
    pub fn is_fully_operational(&self) -> bool {
        self.scaler.is_some()
            && self.isolation_forest.is_some()
            && self.autoencoder.is_some()
            && self.classifier.is_some()
    }

    /// True when the explain path can serve requests.
    pub fn can_explain(&self) -> bool {
        self.scaler.is_some() && self.isolation_forest.is_some() && self.explainer.is_some()
    }

    pub fn scaler(&self) -> Option<&Scaler> {
        self.scaler.as_ref()
    }

    pub fn isolation_forest(&self) -> Option<&Arc<IsolationForest>> {
        self.isolation_forest.as_ref()
    }

    pub fn autoencoder(&self) -> Option<&Autoencoder> {
        self.autoencoder.as_ref()
    }

    pub fn classifier(&self) -> Option<&GradientBoostedClassifier> {
        self.classifier.as_ref()
    }

    pub fn explainer(&self) -> Option<&TreeExplainer> {
        self.explainer.as_ref()
    }

    pub fn status(&self) -> RegistryStatus {
        RegistryStatus {
            fully_operational: self.is_fully_operational(),
            scaler_loaded: self.scaler.is_some(),
            isolation_forest_loaded: self.isolation_forest.is_some(),
            autoencoder_loaded: self.autoencoder.is_some(),
            classifier_loaded: self.classifier.is_some(),
            explainer_available: self.explainer.is_some(),
            feature_version: FEATURE_VERSION,
            feature_count: FEATURE_COUNT,
            layout_hash: layout_hash(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Snapshot of registry state for status/health reporting
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStatus {
    pub fully_operational: bool,
    pub scaler_loaded: bool,
    pub isolation_forest_loaded: bool,
    pub autoencoder_loaded: bool,
    pub classifier_loaded: bool,
    pub explainer_available: bool,
    pub feature_version: u8,
    pub feature_count: usize,
    pub layout_hash: u32,
    pub loaded_at: DateTime<Utc>,
}

fn load_slot<A, T, F>(dir: &Path, file: &str, build: F) -> Option<T>
where
    A: DeserializeOwned,
    F: FnOnce(A) -> PipelineResult<T>,
{
    match read_artifact::<A>(&dir.join(file)).and_then(build) {
        Ok(loaded) => {
            log::info!("loaded {}", file);
            Some(loaded)
        }
        Err(e) => {
            log::warn!("could not load {}: {}", file, e);
            None
        }
    }
}

fn read_artifact<A: DeserializeOwned>(path: &Path) -> PipelineResult<A> {
    let contents = fs::read_to_string(path)
        .map_err(|e| PipelineError::Artifact(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| PipelineError::Artifact(format!("{}: {}", path.display(), e)))
}

// ============================================================================
// TESTS
// ============================================================================
