//! DTOs for health check endpoint.

use serde::Serialize;

/// Liveness report served at `GET /api/healthz`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,
    /// Seconds since the process started.
    pub uptime: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
