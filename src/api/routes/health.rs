//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (GraphQL endpoint answers)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Returns 200 once the GraphQL endpoint answers an introspection query.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match check_graphql_health(&state).await {
        true => StatusCode::OK,
        false => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let graphql_ok = check_graphql_health(&state).await;

    Json(HealthResponse {
        status: if graphql_ok { "healthy" } else { "degraded" }.to_string(),
        graphql: if graphql_ok { "ok" } else { "error" }.to_string(),
        sessions: state.sessions.len().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_graphql_health(state: &AppState) -> bool {
    match state.services.schema.list_base_tables().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "GraphQL endpoint health check failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
