//! # MyUI
//!
//! Shell of a dashboard-building web application: header bar, navigation
//! sidebar and a workspace that renders user-configured dashboards, with the
//! user's configuration kept in a versioned table behind a GraphQL endpoint.
//!
//! ## Features
//!
//! - **Versioned configuration**: append-only snapshots per user, latest wins
//! - **Coalescing persistence**: one write in flight, newest edit wins
//! - **Schema introspection**: base tables without generated variants
//! - **Workspace state machine**: empty, base table, dashboard view and edit
//! - **HTTP API**: one shell session per page, served with Axum
//!
//! ## Modules
//!
//! - [`userconfig`]: Configuration model and in-memory store
//! - [`graphql`]: GraphQL transport (HTTP and in-process)
//! - [`sync`]: Configuration fetch, persist and the persistence worker
//! - [`schema`]: Base table introspection
//! - [`shell`]: Workspace, sidebar, header and the session controller
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use myui::auth::SessionClaims;
//! use myui::graphql::MemoryBackend;
//! use myui::shell::{ShellOptions, ShellServices, ShellSession};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let services = ShellServices::new(Arc::new(MemoryBackend::new()), ShellOptions::default());
//!     let mut session = ShellSession::open(services, SessionClaims::default()).await;
//!
//!     session.add_dashboard("Sales").unwrap();
//!     session.select_dashboard("Sales");
//!     session.toggle_edit_mode();
//!
//!     println!("{:?}", session.view().workspace);
//!     session.flush(std::time::Duration::from_secs(5)).await;
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod graphql;
pub mod logging;
pub mod schema;
pub mod shell;
pub mod sync;
pub mod userconfig;

// Re-export top-level types for convenience
pub use userconfig::{
    BaseTableConfig, ConfigEditError, Dashboard, Element, ElementKind, StoreError, UiPreferences,
    UserConfigStore, UserConfiguration,
};

pub use graphql::{GraphqlTransport, HasuraClient, HasuraConfig, MemoryBackend, SyncError, SyncResult};

pub use sync::{ConfigPersister, ConfigSyncClient, PersistStatus};

pub use schema::SchemaIntrospector;

pub use auth::{SessionClaims, SessionUser, UserId};

pub use shell::{
    ShellError, ShellOptions, ShellServices, ShellSession, ShellView, WorkspaceState,
    WorkspaceStateMachine,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
