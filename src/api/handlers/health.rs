//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::HealthResponse;
use crate::state::AppState;

/// Reports liveness, version and uptime.
///
/// # Endpoint
///
/// `GET /api/healthz`
///
/// # Response Codes
///
/// - **200 OK**: the link store answered a ping
/// - **503 Service Unavailable**: the store is unreachable
///
/// # Response
///
/// ```json
/// { "ok": true, "version": "0.1.0", "uptime": 42 }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let uptime = state.started_at.elapsed().as_secs();
    let version = env!("CARGO_PKG_VERSION").to_string();

    match state.link_service.ping().await {
        Ok(()) => Ok(Json(HealthResponse {
            ok: true,
            version,
            uptime,
            message: None,
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    ok: false,
                    version,
                    uptime,
                    message: Some(format!("Store error: {}", e)),
                }),
            ))
        }
    }
}
