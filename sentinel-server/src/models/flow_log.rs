//! Flow log model - one row per ingested and scored flow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FlowLog {
    pub log_id: Uuid,
    pub timestamp_iso: DateTime<Utc>,
    pub display_timestamp: Option<String>,
    pub source_ip: Option<String>,
    pub attack_type: Option<String>,
    pub features: Option<String>,
    pub severity: String,
    pub username: Option<String>,
    pub source_system: Option<String>,
    pub target_ip: Option<String>,
    pub message: Option<String>,
    pub ai_if_score: Option<f64>,
    pub status: Option<String>,
    pub log_count: Option<i32>,
}

/// Insert payload assembled by the ingest handler
#[derive(Debug, Clone)]
pub struct NewFlowLog {
    pub log_id: Uuid,
    pub timestamp_iso: DateTime<Utc>,
    pub display_timestamp: String,
    pub source_ip: String,
    pub attack_type: String,
    pub features: String,
    pub severity: String,
    pub username: String,
    pub source_system: String,
    pub target_ip: String,
    pub message: String,
    pub ai_if_score: f64,
    pub log_count: i32,
}

/// Aggregate counters for the dashboard
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FlowLogStats {
    pub total_logs: i64,
    pub total_threats: i64,
    pub active_alerts: i64,
}

impl FlowLog {
    pub async fn create(pool: &PgPool, data: NewFlowLog) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, FlowLog>(
            r#"
            INSERT INTO flow_logs (
                log_id, timestamp_iso, display_timestamp, source_ip, attack_type,
                features, severity, username, source_system, target_ip, message,
                ai_if_score, status, log_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'Active', $13)
            RETURNING *
            "#,
        )
        .bind(data.log_id)
        .bind(data.timestamp_iso)
        .bind(&data.display_timestamp)
        .bind(&data.source_ip)
        .bind(&data.attack_type)
        .bind(&data.features)
        .bind(&data.severity)
        .bind(&data.username)
        .bind(&data.source_system)
        .bind(&data.target_ip)
        .bind(&data.message)
        .bind(data.ai_if_score)
        .bind(data.log_count)
        .fetch_one(pool)
        .await
    }

    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FlowLog>(
            "SELECT * FROM flow_logs ORDER BY timestamp_iso DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Mark a log as handled, prefixing its analysis message.
    pub async fn mark_mitigated(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FlowLog>(
            r#"
            UPDATE flow_logs
            SET status = 'Mitigated',
                message = '[MITIGATED] ' || COALESCE(message, '')
            WHERE log_id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn stats(pool: &PgPool) -> Result<FlowLogStats, sqlx::Error> {
        let (total_logs,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM flow_logs")
            .fetch_one(pool)
            .await?;

        let (total_threats,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM flow_logs WHERE severity IN ('HIGH', 'CRITICAL')",
        )
        .fetch_one(pool)
        .await?;

        let (active_alerts,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM flow_logs WHERE severity != 'LOW'")
                .fetch_one(pool)
                .await?;

        Ok(FlowLogStats {
            total_logs,
            total_threats,
            active_alerts,
        })
    }
}
