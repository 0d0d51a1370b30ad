//! Session Routes
//!
//! Each handler locks one session, applies a user action and answers with
//! the refreshed shell view.
//!
//! - POST /api/v1/sessions - Open a session
//! - GET /api/v1/sessions/:id - Current view
//! - DELETE /api/v1/sessions/:id - Flush staged edits and close

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{
    CreateDashboardRequest, CreateSessionRequest, LocaleRequest, LocaleResponse,
    SelectDashboardRequest, SelectTableRequest, SessionResponse, SyncStatusResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::{session_limit, AppState};
use crate::shell::{ShellSession, SidebarGroup};
use crate::userconfig::Element;

fn respond(id: Uuid, session: &mut ShellSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        session_id: id,
        view: session.view(),
    })
}

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CreateSessionRequest>>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    if !state.sessions.has_capacity().await {
        return Err(session_limit(state.config.max_sessions));
    }

    let claims = body.map(|Json(req)| req).unwrap_or_default().into();
    let session = ShellSession::open(state.services.clone(), claims).await;
    let (id, shared) = state.sessions.insert(session).await?;

    let mut session = shared.lock().await;
    tracing::info!(session_id = %id, user_id = session.user().id, "Session created");
    Ok((StatusCode::CREATED, respond(id, &mut session)))
}

/// GET /api/v1/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionResponse>> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    Ok(respond(id, &mut session))
}

/// DELETE /api/v1/sessions/:id
///
/// Waits (bounded) for staged edits before dropping the session.
pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let shared = state.sessions.remove(id).await?;
    let session = shared.lock().await;

    let flushed = session.flush(state.config.flush_timeout()).await;
    if !flushed {
        tracing::warn!(
            session_id = %id,
            status = ?session.persist_status(),
            "Session closed with unsaved edits"
        );
    }

    tracing::info!(session_id = %id, flushed, "Session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/reload
pub async fn reload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionResponse>> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.reload().await;
    Ok(respond(id, &mut session))
}

/// POST /api/v1/sessions/:id/tables/select
pub async fn select_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectTableRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.click_sidebar(SidebarGroup::BaseTables, &req.name);
    Ok(respond(id, &mut session))
}

/// POST /api/v1/sessions/:id/dashboards/select
pub async fn select_dashboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectDashboardRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.click_sidebar(SidebarGroup::Dashboards, &req.key);
    Ok(respond(id, &mut session))
}

/// POST /api/v1/sessions/:id/edit-mode
pub async fn toggle_edit_mode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionResponse>> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.toggle_edit_mode();
    Ok(respond(id, &mut session))
}

/// POST /api/v1/sessions/:id/locale
pub async fn change_locale(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<LocaleRequest>,
) -> ApiResult<Json<LocaleResponse>> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    let route = session.change_locale(req.locale, &req.path);

    Ok(Json(LocaleResponse {
        route,
        view: session.view(),
    }))
}

/// POST /api/v1/sessions/:id/dashboards
pub async fn add_dashboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateDashboardRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.add_dashboard(&req.name)?;
    Ok((StatusCode::CREATED, respond(id, &mut session)))
}

/// DELETE /api/v1/sessions/:id/dashboards/:name
pub async fn remove_dashboard(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(Uuid, String)>,
) -> ApiResult<Json<SessionResponse>> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.remove_dashboard(&name)?;
    Ok(respond(id, &mut session))
}

/// PUT /api/v1/sessions/:id/elements
pub async fn upsert_element(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(element): Json<Element>,
) -> ApiResult<Json<SessionResponse>> {
    if element.name.trim().is_empty() {
        return Err(ApiError::Validation("element name must not be empty".to_string()));
    }

    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.upsert_element(element)?;
    Ok(respond(id, &mut session))
}

/// DELETE /api/v1/sessions/:id/elements/:name
pub async fn remove_element(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(Uuid, String)>,
) -> ApiResult<Json<SessionResponse>> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.remove_element(&name)?;
    Ok(respond(id, &mut session))
}

/// POST /api/v1/sessions/:id/elements/:name/edit
pub async fn edit_element(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(Uuid, String)>,
) -> ApiResult<Json<SessionResponse>> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.edit_element(&name)?;
    Ok(respond(id, &mut session))
}

/// POST /api/v1/sessions/:id/settings
pub async fn open_global_settings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionResponse>> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.open_global_settings()?;
    Ok(respond(id, &mut session))
}

/// POST /api/v1/sessions/:id/modal/close
pub async fn close_modal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionResponse>> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.close_modal();
    Ok(respond(id, &mut session))
}

/// GET /api/v1/sessions/:id/sync
pub async fn sync_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SyncStatusResponse>> {
    let shared = state.sessions.get(id).await?;
    let session = shared.lock().await;

    Ok(Json(SyncStatusResponse {
        status: session.persist_status(),
        pending: session.has_pending_edits(),
    }))
}
