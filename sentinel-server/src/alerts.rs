//! Alert dispatch - webhook notifications for elevated severities
//!
//! Channels are configured by URL; each has a format and a severity floor.
//! Dispatch is fire-and-forget: the caller spawns it, the shared reqwest
//! client bounds it with a timeout, and failures only produce log lines —
//! an unreachable webhook can never affect a verdict.

use serde_json::json;

use flowsentinel_core::Severity;

use crate::models::FlowLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertFormat {
    Slack,
    Generic,
}

#[derive(Debug, Clone)]
pub struct AlertChannel {
    pub name: String,
    pub url: String,
    pub format: AlertFormat,
    pub min_severity: Severity,
}

/// Build the channel list from configuration
pub fn channels_from_config(config: &crate::config::Config) -> Vec<AlertChannel> {
    let mut channels = Vec::new();

    if let Some(url) = &config.slack_webhook_url {
        channels.push(AlertChannel {
            name: "slack".to_string(),
            url: url.clone(),
            format: AlertFormat::Slack,
            min_severity: Severity::Medium,
        });
    }

    if let Some(url) = &config.alert_webhook_url {
        channels.push(AlertChannel {
            name: "webhook".to_string(),
            url: url.clone(),
            format: AlertFormat::Generic,
            min_severity: Severity::Medium,
        });
    }

    channels
}

/// Send the alert to every channel whose severity floor it clears.
pub async fn dispatch(client: &reqwest::Client, channels: &[AlertChannel], log: &FlowLog) {
    let severity: Severity = match log.severity.parse() {
        Ok(severity) => severity,
        Err(()) => {
            tracing::warn!("unknown severity {:?}, skipping alert", log.severity);
            return;
        }
    };

    for channel in channels {
        if severity < channel.min_severity {
            continue;
        }

        let payload = format_payload(channel.format, log, severity);
        match client.post(&channel.url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!("alert sent to {} ({})", channel.name, response.status());
            }
            Ok(response) => {
                tracing::warn!(
                    "alert channel {} responded with {}",
                    channel.name,
                    response.status()
                );
            }
            Err(e) => {
                tracing::warn!("failed to send alert to {}: {}", channel.name, e);
            }
        }
    }
}

fn format_payload(format: AlertFormat, log: &FlowLog, severity: Severity) -> serde_json::Value {
    match format {
        AlertFormat::Slack => format_slack(log, severity),
        AlertFormat::Generic => format_generic(log, severity),
    }
}

fn format_slack(log: &FlowLog, severity: Severity) -> serde_json::Value {
    let title = format!(
        "{} ALERT: {}",
        severity.as_str(),
        log.attack_type.as_deref().unwrap_or("Unknown Event")
    );

    json!({
        "blocks": [
            {
                "type": "header",
                "text": { "type": "plain_text", "text": title, "emoji": true }
            },
            {
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": log.message.as_deref().unwrap_or("No additional details")
                }
            },
            {
                "type": "section",
                "fields": [
                    { "type": "mrkdwn", "text": format!("*Severity:* {}", severity.as_str()) },
                    { "type": "mrkdwn", "text": format!("*Source IP:* {}", log.source_ip.as_deref().unwrap_or("N/A")) },
                    { "type": "mrkdwn", "text": format!("*Log ID:* {}", log.log_id) },
                    { "type": "mrkdwn", "text": format!("*Timestamp:* {}", log.timestamp_iso.format("%Y-%m-%d %H:%M:%S UTC")) }
                ]
            }
        ],
        "attachments": [{ "color": severity_color(severity) }]
    })
}

fn format_generic(log: &FlowLog, severity: Severity) -> serde_json::Value {
    json!({
        "log_id": log.log_id,
        "severity": severity.as_str(),
        "attack_type": log.attack_type,
        "source_ip": log.source_ip,
        "target_ip": log.target_ip,
        "message": log.message,
        "timestamp": log.timestamp_iso.to_rfc3339(),
    })
}

/// Dashboard/alert color per severity
pub fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "#ff4444",
        Severity::High => "#ff6600",
        Severity::Medium => "#ffaa00",
        Severity::Low => "#00ff88",
    }
}

// ============================================================================
// TESTS
// ============================================================================
