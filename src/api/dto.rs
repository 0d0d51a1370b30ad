//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{SessionClaims, UserId};
use crate::shell::{Locale, RouteUpdate, ShellView};
use crate::sync::PersistStatus;

// ============================================
// SESSION DTOs
// ============================================

/// Session open request; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl From<CreateSessionRequest> for SessionClaims {
    fn from(req: CreateSessionRequest) -> Self {
        SessionClaims {
            user_id: req.user_id,
            roles: req.roles,
        }
    }
}

/// A session id with its current view
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub view: ShellView,
}

// ============================================
// NAVIGATION DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct SelectTableRequest {
    pub name: String,
}

/// Dashboard name or one of the reserved management keys
#[derive(Debug, Deserialize)]
pub struct SelectDashboardRequest {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct LocaleRequest {
    pub locale: Locale,
    /// Current browser path including query string
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_path() -> String {
    "/".to_string()
}

#[derive(Debug, Serialize)]
pub struct LocaleResponse {
    pub route: RouteUpdate,
    pub view: ShellView,
}

// ============================================
// DASHBOARD DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct CreateDashboardRequest {
    pub name: String,
}

// ============================================
// SYNC DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub status: PersistStatus,
    /// An edit is staged but not yet stored
    pub pending: bool,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy or degraded
    pub status: String,
    /// GraphQL endpoint status
    pub graphql: String,
    /// Open sessions
    pub sessions: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
