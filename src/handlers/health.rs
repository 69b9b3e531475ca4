//! Health check and status summary

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
}

/// Liveness check
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().timestamp(),
    })
}

/// Body of a plain `GET` on the webhook endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub total_requests: usize,
    pub endpoints: StatusEndpoints,
}

#[derive(Debug, Serialize)]
pub struct StatusEndpoints {
    pub history: &'static str,
    pub clear: &'static str,
}

impl StatusSummary {
    pub fn new(total_requests: usize) -> Self {
        Self {
            status: "ok",
            message: "Slack webhook is running",
            timestamp: Utc::now(),
            total_requests,
            endpoints: StatusEndpoints {
                history: "?action=history",
                clear: "?action=clear",
            },
        }
    }
}
