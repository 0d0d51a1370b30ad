//! MyUI HTTP API
//!
//! JSON API over shell sessions, built with Axum. The browser opens a
//! session, sends user actions and renders the returned view.
//!
//! # Endpoints
//!
//! ## Sessions
//! - `POST /api/v1/sessions` - Open a session (`{userId?, roles}`)
//! - `GET /api/v1/sessions/:id` - Current view
//! - `DELETE /api/v1/sessions/:id` - Flush staged edits and close
//! - `POST /api/v1/sessions/:id/reload` - Fetch configuration and tables again
//!
//! ## Navigation
//! - `POST /api/v1/sessions/:id/tables/select` - Show a base table
//! - `POST /api/v1/sessions/:id/dashboards/select` - Show a dashboard or open the manage modal
//! - `POST /api/v1/sessions/:id/edit-mode` - Toggle dashboard edit mode
//! - `POST /api/v1/sessions/:id/locale` - Switch locale
//!
//! ## Editing
//! - `POST /api/v1/sessions/:id/dashboards` - Add a dashboard
//! - `DELETE /api/v1/sessions/:id/dashboards/:name` - Remove a dashboard
//! - `PUT /api/v1/sessions/:id/elements` - Add or replace an element
//! - `DELETE /api/v1/sessions/:id/elements/:name` - Remove an element
//! - `POST /api/v1/sessions/:id/elements/:name/edit` - Open the element editor
//! - `POST /api/v1/sessions/:id/settings` - Open global settings (admin)
//! - `POST /api/v1/sessions/:id/modal/close` - Close the open modal
//! - `GET /api/v1/sessions/:id/sync` - Persistence status
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, SessionRegistry, SharedSession};

use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use routes::sessions;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Session lifecycle
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/:id",
            get(sessions::get_session).delete(sessions::close_session),
        )
        .route("/sessions/:id/reload", post(sessions::reload))
        // Navigation
        .route("/sessions/:id/tables/select", post(sessions::select_table))
        .route(
            "/sessions/:id/dashboards/select",
            post(sessions::select_dashboard),
        )
        .route("/sessions/:id/edit-mode", post(sessions::toggle_edit_mode))
        .route("/sessions/:id/locale", post(sessions::change_locale))
        // Dashboard and element editing
        .route("/sessions/:id/dashboards", post(sessions::add_dashboard))
        .route(
            "/sessions/:id/dashboards/:name",
            delete(sessions::remove_dashboard),
        )
        .route("/sessions/:id/elements", put(sessions::upsert_element))
        .route(
            "/sessions/:id/elements/:name",
            delete(sessions::remove_element),
        )
        .route(
            "/sessions/:id/elements/:name/edit",
            post(sessions::edit_element),
        )
        // Modals
        .route("/sessions/:id/settings", post(sessions::open_global_settings))
        .route("/sessions/:id/modal/close", post(sessions::close_modal))
        // Persistence
        .route("/sessions/:id/sync", get(sessions::sync_status));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = TimeoutLayer::new(state.config.request_timeout());
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(cors)
        .with_state(shared_state)
}

/// CORS for the configured origins; permissive when none are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let sweeper = Arc::clone(&state.sessions)
        .start_sweeper(config.session_sweep_interval(), config.flush_timeout());
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("MyUI API listening on {}", addr);

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    sweeper.abort();
    served.map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("MyUI API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::{GraphqlTransport, MemoryBackend};
    use crate::shell::{ShellOptions, ShellServices, DASHBOARD_ADD_KEY};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn create_test_app_with(backend: Arc<MemoryBackend>, config: ApiConfig) -> Router {
        let services = ShellServices::new(
            backend as Arc<dyn GraphqlTransport>,
            ShellOptions::default(),
        );
        build_router(AppState::new(services, config))
    }

    fn create_test_app() -> (Router, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::with_root_fields([
            "Product",
            "Product_aggregate",
            "Product_by_pk",
            "user_versioned_config",
        ]));
        let app = create_test_app_with(Arc::clone(&backend), ApiConfig::default());
        (app, backend)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("Content-Type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn open_session(app: &Router, body: Option<Value>) -> String {
        let (status, value) = send(app, "POST", "/api/v1/sessions", body).await;
        assert_eq!(status, StatusCode::CREATED);
        value["sessionId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _backend) = create_test_app();
        let (status, _) = send(&app, "GET", "/health/live", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_follows_backend() {
        let (app, backend) = create_test_app();
        let (status, _) = send(&app, "GET", "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);

        backend.set_offline(true);
        let (status, _) = send(&app, "GET", "/health/ready", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
    }

    #[tokio::test]
    async fn test_open_session_view() {
        let (app, _backend) = create_test_app();
        let (status, body) = send(&app, "POST", "/api/v1/sessions", None).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["view"]["userId"], 1);
        assert_eq!(body["view"]["workspace"]["displaying"], "EMPTY");
        assert_eq!(body["view"]["sidebar"]["kind"], "navigation");
        assert_eq!(
            body["view"]["sidebar"]["model"]["sections"][0]["items"][0]["key"],
            "Product"
        );
        assert_eq!(body["view"]["content"]["kind"], "placeholder");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (app, _backend) = create_test_app();
        let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&app, "GET", &uri, None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_dashboard_flow() {
        let (app, backend) = create_test_app();
        let id = open_session(&app, Some(json!({ "userId": 7 }))).await;
        let base = format!("/api/v1/sessions/{}", id);

        let (_, body) = send(
            &app,
            "POST",
            &format!("{}/dashboards/select", base),
            Some(json!({ "key": DASHBOARD_ADD_KEY })),
        )
        .await;
        assert_eq!(body["view"]["modal"]["modal"], "manage_dashboards");
        assert_eq!(body["view"]["modal"]["mode"], "add");

        let (status, body) = send(
            &app,
            "POST",
            &format!("{}/dashboards", base),
            Some(json!({ "name": "Sales" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["view"]["modal"]["modal"], "none");

        let (_, body) = send(
            &app,
            "POST",
            &format!("{}/dashboards/select", base),
            Some(json!({ "key": "Sales" })),
        )
        .await;
        assert_eq!(body["view"]["workspace"]["displaying"], "DISPLAY_DASHBOARD");
        assert_eq!(body["view"]["header"]["gear"]["rotated"], false);

        let (status, _) = send(
            &app,
            "PUT",
            &format!("{}/elements", base),
            Some(json!({ "name": "note", "x": 0, "y": 0, "w": 4, "h": 2, "type": 1, "text": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        send(&app, "POST", &format!("{}/edit-mode", base), None).await;
        let (status, body) = send(
            &app,
            "PUT",
            &format!("{}/elements", base),
            Some(json!({ "name": "note", "x": 0, "y": 0, "w": 4, "h": 2, "type": 1, "text": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["sidebar"]["kind"], "edit_mode");
        assert_eq!(body["view"]["content"]["elements"][0]["content"]["type"], "text");

        let (status, _) = send(&app, "DELETE", &base, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let rows = backend.rows(7).await;
        assert!(!rows.is_empty());
        assert!(rows[rows.len() - 1].config.contains("note"));

        let (status, _) = send(&app, "GET", &base, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_locale_switch() {
        let (app, _backend) = create_test_app();
        let id = open_session(&app, None).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/locale", id),
            Some(json!({ "locale": "en", "path": "/nl/reports?page=2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["route"]["href"], "/en/reports?page=2");
        assert_eq!(body["view"]["locale"], "en");
    }

    #[tokio::test]
    async fn test_settings_forbidden_for_non_admin() {
        let (app, _backend) = create_test_app();
        let id = open_session(&app, None).await;
        let uri = format!("/api/v1/sessions/{}/settings", id);

        let (status, body) = send(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");

        let admin = open_session(&app, Some(json!({ "roles": ["admin"] }))).await;
        let uri = format!("/api/v1/sessions/{}/settings", admin);
        let (status, body) = send(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["modal"]["modal"], "global_settings");
    }

    #[tokio::test]
    async fn test_empty_dashboard_name_rejected() {
        let (app, _backend) = create_test_app();
        let id = open_session(&app, None).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/dashboards", id),
            Some(json!({ "name": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_session_limit() {
        let backend = Arc::new(MemoryBackend::new());
        let config = ApiConfig {
            max_sessions: 1,
            ..ApiConfig::default()
        };
        let app = create_test_app_with(backend, config);

        open_session(&app, None).await;
        let (status, _) = send(&app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_sync_status() {
        let (app, _backend) = create_test_app();
        let id = open_session(&app, None).await;

        let (status, body) = send(&app, "GET", &format!("/api/v1/sessions/{}/sync", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["state"], "idle");
        assert_eq!(body["pending"], false);
    }
}
