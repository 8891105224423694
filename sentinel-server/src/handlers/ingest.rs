//! Ingest handler - score a flow, persist the verdict, propagate it

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{FlowLog, NewFlowLog};
use crate::{alerts, ledger, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub features: String,
    pub timestamp: Option<String>,
    pub source_ip: Option<String>,
    pub target_ip: Option<String>,
    pub attack_type: Option<String>,
    pub user: Option<String>,
    pub source_system: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub log_id: Uuid,
    pub message: &'static str,
    pub severity: String,
    pub ledger: bool,
}

pub async fn ingest(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> AppResult<Json<IngestResponse>> {
    // Malformed feature strings surface as 400; sentinel verdicts (demo
    // mode, internal fault) come back as ordinary results.
    let result = state.pipeline.run_inference(&req.features)?;

    let log_id = Uuid::new_v4();
    let timestamp = parse_timestamp(req.timestamp.as_deref());

    // Callers that only send the generic placeholder get the AI label
    let attack_type = match req.attack_type {
        Some(a) if a != "Unknown Event" => a,
        _ => result.label.clone(),
    };

    let message = format!(
        "AI Analysis: {} (IF Score: {:.2}, AE Loss: {:.4})",
        result.label, result.isolation_forest_score, result.autoencoder_error
    );

    let log_count = rand::thread_rng().gen_range(12..77);

    let row = FlowLog::create(
        &state.pool,
        NewFlowLog {
            log_id,
            timestamp_iso: timestamp,
            display_timestamp: format_display_timestamp(&timestamp),
            source_ip: req.source_ip.unwrap_or_else(|| "N/A".to_string()),
            attack_type,
            features: req.features,
            severity: result.severity.as_str().to_string(),
            username: req.user.unwrap_or_else(|| "system".to_string()),
            source_system: req.source_system.unwrap_or_else(|| "simulator".to_string()),
            target_ip: req.target_ip.unwrap_or_else(|| "N/A".to_string()),
            message,
            ai_if_score: result.isolation_forest_score,
            log_count,
        },
    )
    .await?;

    tracing::info!(
        "flow log stored: {} severity {} ({} votes)",
        log_id,
        row.severity,
        result.vote_count
    );

    // Side effects are fire-and-forget: the verdict never waits on them.
    if let Some(ledger_url) = state.config.ledger_url.clone() {
        let client = state.http.clone();
        let entry = row.clone();
        tokio::spawn(async move {
            ledger::append(&client, &ledger_url, &entry).await;
        });
    }

    if result.severity.is_alertable() && !state.alert_channels.is_empty() {
        let client = state.http.clone();
        let channels = state.alert_channels.clone();
        let entry = row.clone();
        tokio::spawn(async move {
            alerts::dispatch(&client, &channels, &entry).await;
        });
    }

    Ok(Json(IngestResponse {
        log_id,
        message: "Log ingested successfully",
        severity: row.severity,
        ledger: state.config.ledger_url.is_some(),
    }))
}

/// Parse the caller's timestamp, falling back to now
fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    let Some(raw) = raw else {
        return Utc::now();
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc);
    }

    // Tolerate bare "YYYY-MM-DDTHH:MM:SS" with stripped subseconds/zone
    let cleaned = raw.split('.').next().unwrap_or(raw).trim_end_matches('Z');
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(cleaned, "%Y-%m-%dT%H:%M:%S") {
        return DateTime::from_naive_utc_and_offset(naive, Utc);
    }

    Utc::now()
}

fn format_display_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%m/%d/%Y, %I:%M:%S %p").to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let parsed = parse_timestamp(Some("2026-08-07T10:30:00Z"));
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 8, 7, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_without_zone() {
        let parsed = parse_timestamp(Some("2026-08-07T10:30:00.123456"));
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 8, 7, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_garbage_falls_back() {
        let before = Utc::now();
        let parsed = parse_timestamp(Some("yesterday-ish"));
        assert!(parsed >= before);
    }

    #[test]
    fn test_display_timestamp_format() {
        let timestamp = parse_timestamp(Some("2026-08-07T13:05:09Z"));
        assert_eq!(format_display_timestamp(&timestamp), "08/07/2026, 01:05:09 PM");
    }
}
