use crate::api::MgmtState;
use crate::api::schemas::health::HealthResponse;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

pub async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

/// 503 until the database answers.
pub async fn readyz(State(state): State<MgmtState>) -> impl IntoResponse {
    match state.health_service.database_ready().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::reporting(true))),
        Err(e) => {
            tracing::warn!(error = %e, "not ready: database unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(HealthResponse::reporting(false)))
        }
    }
}
