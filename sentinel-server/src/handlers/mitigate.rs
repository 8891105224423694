//! Mitigate handler - mark a stored verdict as handled

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::FlowLog;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct MitigateRequest {
    pub log_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MitigateResponse {
    pub success: bool,
    pub message: String,
    pub log_id: Uuid,
}

pub async fn mitigate(
    State(state): State<AppState>,
    Json(req): Json<MitigateRequest>,
) -> AppResult<Json<MitigateResponse>> {
    let log = FlowLog::mark_mitigated(&state.pool, req.log_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Log not found".to_string()))?;

    let source_ip = log.source_ip.as_deref().unwrap_or("Unknown");
    tracing::info!("threat {} mitigated; blocking {}", req.log_id, source_ip);

    Ok(Json(MitigateResponse {
        success: true,
        message: format!("Threat mitigated successfully. IP {} blocked.", source_ip),
        log_id: req.log_id,
    }))
}
