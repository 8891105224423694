//! Dashboard handler - recent alerts, logs, and aggregate stats

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::json;

use flowsentinel_core::Severity;

use crate::alerts::severity_color;
use crate::models::FlowLog;
use crate::{AppResult, AppState};

const RECOMMENDED_ACTIONS: [&str; 4] = [
    "Isolate affected system.",
    "Analyze traffic logs.",
    "Check user credentials.",
    "Update security rules.",
];

#[derive(Debug, Serialize)]
pub struct AlertView {
    pub id: String,
    pub title: String,
    pub severity: String,
    #[serde(rename = "sourceIp")]
    pub source_ip: String,
    #[serde(rename = "targetIp")]
    pub target_ip: String,
    pub timestamp: Option<String>,
    pub description: String,
    #[serde(rename = "recommendedActions")]
    pub recommended_actions: Vec<String>,
    #[serde(rename = "affectedSystem")]
    pub affected_system: String,
    pub color: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct LogView {
    pub id: String,
    pub timestamp: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub user: String,
    #[serde(rename = "ipAddress")]
    pub ip_address: String,
    pub severity: String,
    pub message: Option<String>,
    #[serde(rename = "rawData")]
    pub raw_data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    #[serde(rename = "cpuUsage")]
    pub cpu_usage: f64,
    #[serde(rename = "memoryUsage")]
    pub memory_usage: f64,
    #[serde(rename = "logIngestionRate")]
    pub log_ingestion_rate: String,
    #[serde(rename = "totalThreats")]
    pub total_threats: i64,
    pub anomalies: i64,
    #[serde(rename = "activeAlerts")]
    pub active_alerts: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub alerts: Vec<AlertView>,
    pub all_logs: Vec<LogView>,
    pub stats: DashboardStats,
}

pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardResponse>> {
    let recent = FlowLog::recent(&state.pool, 20).await?;
    let counters = FlowLog::stats(&state.pool).await?;
    let snapshot = state.stats_rx.borrow().clone();

    let alerts = recent.iter().take(8).map(alert_view).collect();
    let all_logs = recent.iter().map(log_view).collect();

    Ok(Json(DashboardResponse {
        alerts,
        all_logs,
        stats: DashboardStats {
            cpu_usage: snapshot.cpu.usage_percent,
            memory_usage: snapshot.memory.usage_percent,
            log_ingestion_rate: "12,577/s".to_string(),
            total_threats: counters.total_threats,
            anomalies: counters.total_logs,
            active_alerts: counters.active_alerts,
        },
    }))
}

fn parsed_severity(log: &FlowLog) -> Severity {
    log.severity.parse().unwrap_or(Severity::Low)
}

fn alert_view(log: &FlowLog) -> AlertView {
    let severity = parsed_severity(log);
    AlertView {
        id: log.log_id.to_string(),
        title: log
            .attack_type
            .clone()
            .unwrap_or_else(|| "Log Event".to_string()),
        severity: severity.as_str().to_string(),
        source_ip: log.source_ip.clone().unwrap_or_else(|| "N/A".to_string()),
        target_ip: log.target_ip.clone().unwrap_or_else(|| "N/A".to_string()),
        timestamp: log.display_timestamp.clone(),
        description: log
            .message
            .clone()
            .unwrap_or_else(|| "No details available.".to_string()),
        recommended_actions: RECOMMENDED_ACTIONS.iter().map(|s| s.to_string()).collect(),
        affected_system: log
            .source_system
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        color: severity_color(severity).to_string(),
        status: log.status.clone().unwrap_or_else(|| "Active".to_string()),
    }
}

fn log_view(log: &FlowLog) -> LogView {
    LogView {
        id: log.log_id.to_string(),
        timestamp: log.display_timestamp.clone(),
        kind: log
            .attack_type
            .as_deref()
            .unwrap_or("SYSTEM")
            .to_uppercase(),
        source: log
            .source_system
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        user: log.username.clone().unwrap_or_else(|| "N/A".to_string()),
        ip_address: log.source_ip.clone().unwrap_or_else(|| "N/A".to_string()),
        severity: log.severity.to_uppercase(),
        message: log.message.clone(),
        raw_data: json!({
            "log_id": log.log_id,
            "timestamp_iso": log.timestamp_iso.to_rfc3339(),
            "severity": log.severity,
            "source_ip": log.source_ip,
            "attack_type": log.attack_type,
            "status": log.status,
            "features": log.features,
        }),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_log(severity: &str) -> FlowLog {
        FlowLog {
            log_id: Uuid::nil(),
            timestamp_iso: Utc::now(),
            display_timestamp: Some("08/07/2026, 01:05:09 PM".to_string()),
            source_ip: Some("192.168.1.50".to_string()),
            attack_type: Some("Suspected Anomaly".to_string()),
            features: Some("0,0,0".to_string()),
            severity: severity.to_string(),
            username: None,
            source_system: Some("simulator".to_string()),
            target_ip: None,
            message: Some("AI Analysis: Suspected Anomaly".to_string()),
            ai_if_score: Some(-0.6),
            status: Some("Active".to_string()),
            log_count: Some(30),
        }
    }

    #[test]
    fn test_alert_view_colors_follow_severity() {
        assert_eq!(alert_view(&sample_log("CRITICAL")).color, "#ff4444");
        assert_eq!(alert_view(&sample_log("HIGH")).color, "#ff6600");
        assert_eq!(alert_view(&sample_log("MEDIUM")).color, "#ffaa00");
        assert_eq!(alert_view(&sample_log("LOW")).color, "#00ff88");
        // Unknown severities degrade to LOW rather than failing
        assert_eq!(alert_view(&sample_log("weird")).color, "#00ff88");
    }

    #[test]
    fn test_alert_view_defaults() {
        let mut log = sample_log("HIGH");
        log.source_ip = None;
        let view = alert_view(&log);
        assert_eq!(view.source_ip, "N/A");
        assert_eq!(view.target_ip, "N/A");
        assert_eq!(view.recommended_actions.len(), 4);
    }

    #[test]
    fn test_log_view_uppercases_type() {
        let view = log_view(&sample_log("LOW"));
        assert_eq!(view.kind, "SUSPECTED ANOMALY");
        assert_eq!(view.raw_data["severity"], "LOW");
    }
}
