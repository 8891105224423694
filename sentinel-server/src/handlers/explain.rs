//! Explain handler - per-feature attribution for one prediction

use axum::{extract::State, Json};
use serde::Deserialize;

use flowsentinel_core::Explanation;

use crate::{AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub features: String,
}

/// Returns `{feature_importance: [...], base_value}`; 503 when the models
/// or the explainer are unavailable, 400 on malformed features.
pub async fn explain(
    State(state): State<AppState>,
    Json(req): Json<ExplainRequest>,
) -> AppResult<Json<Explanation>> {
    let explanation = state.pipeline.explain(&req.features)?;

    tracing::info!(
        "attribution generated for {} features",
        explanation.feature_importance.len()
    );

    Ok(Json(explanation))
}
