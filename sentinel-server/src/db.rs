//! Database module - PostgreSQL connection and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Fused verdicts, one row per ingested flow
CREATE TABLE IF NOT EXISTS flow_logs (
    log_id UUID PRIMARY KEY,
    timestamp_iso TIMESTAMPTZ NOT NULL,
    display_timestamp VARCHAR(50),
    source_ip VARCHAR(45),
    attack_type VARCHAR(255),
    features TEXT,
    severity VARCHAR(20) NOT NULL,
    username VARCHAR(255),
    source_system VARCHAR(255),
    target_ip VARCHAR(45),
    message TEXT,
    ai_if_score DOUBLE PRECISION,
    status VARCHAR(20) DEFAULT 'Active',
    log_count INT
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_flow_logs_source_ip ON flow_logs(source_ip);
CREATE INDEX IF NOT EXISTS idx_flow_logs_attack_type ON flow_logs(attack_type);
CREATE INDEX IF NOT EXISTS idx_flow_logs_severity ON flow_logs(severity);
CREATE INDEX IF NOT EXISTS idx_flow_logs_timestamp ON flow_logs(timestamp_iso);
"#;
