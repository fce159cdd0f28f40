use crate::AppState;
use axum::{extract::State, http::StatusCode};

/// Liveness probe: verifies the store backend is reachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "store unreachable")
        }
    }
}
