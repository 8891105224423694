//! Ledger sink - best-effort append to the external audit ledger
//!
//! Network failures are swallowed with a warning; the verdict is already
//! committed by the time this runs and must not depend on ledger health.

use serde::Serialize;

use crate::models::FlowLog;

#[derive(Debug, Serialize)]
struct LedgerEntry<'a> {
    log_id: String,
    severity: &'a str,
    source_ip: Option<&'a str>,
    attack_type: Option<&'a str>,
    message: Option<&'a str>,
    timestamp: String,
    log_count: Option<i32>,
}

pub async fn append(client: &reqwest::Client, base_url: &str, log: &FlowLog) {
    let entry = LedgerEntry {
        log_id: log.log_id.to_string(),
        severity: &log.severity,
        source_ip: log.source_ip.as_deref(),
        attack_type: log.attack_type.as_deref(),
        message: log.message.as_deref(),
        timestamp: log.timestamp_iso.to_rfc3339(),
        log_count: log.log_count,
    };

    let url = format!("{}/log", base_url.trim_end_matches('/'));
    match client.post(&url).json(&entry).send().await {
        Ok(response) if response.status().is_success() => {
            tracing::debug!("ledger append accepted for {}", log.log_id);
        }
        Ok(response) => {
            tracing::warn!("ledger rejected {}: {}", log.log_id, response.status());
        }
        Err(e) => {
            tracing::warn!("cannot reach ledger service: {}", e);
        }
    }
}
