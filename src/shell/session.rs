//! Shell session
//!
//! One `ShellSession` backs one open page. It owns the user's configuration
//! store and its persistence worker, the workspace state machine and the
//! sidebar cache, and turns user actions into state changes and staged
//! configuration edits. Nothing here is shared between sessions.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::header::HeaderView;
use super::i18n::{Locale, Translator};
use super::routing::{Route, RouteUpdate};
use super::sidebar::{NavigationSidebar, SidebarGroup, SidebarSelection, SidebarView};
use super::view::{render, MediaDisplay, WorkspaceView};
use super::workspace::{DashboardSelection, ManageMode, WorkspaceState, WorkspaceStateMachine};
use crate::auth::{SessionClaims, SessionUser, UserId};
use crate::graphql::GraphqlTransport;
use crate::schema::SchemaIntrospector;
use crate::sync::{ConfigPersister, ConfigSyncClient, PersistStatus};
use crate::userconfig::{ConfigEditError, Element, StoreError, UserConfigStore, UserConfiguration};

/// Errors raised by shell actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    #[error("User configuration is not loaded")]
    ConfigNotLoaded,

    #[error(transparent)]
    Edit(#[from] ConfigEditError),

    #[error("No dashboard is being edited")]
    NotEditing,

    #[error("Action requires the admin role")]
    Forbidden,
}

impl From<StoreError> for ShellError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotLoaded => ShellError::ConfigNotLoaded,
            StoreError::Edit(e) => ShellError::Edit(e),
        }
    }
}

pub type ShellResult<T> = Result<T, ShellError>;

/// Deployment settings that shape every session
#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub media_display: MediaDisplay,
    pub logo_src: String,
    /// User id used when the session claims carry none
    pub fallback_user_id: UserId,
    /// Bound on waiting for staged edits before a reload
    pub flush_timeout: Duration,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            media_display: MediaDisplay::Embed,
            logo_src: "/logo.svg".to_string(),
            fallback_user_id: 1,
            flush_timeout: Duration::from_secs(5),
        }
    }
}

/// Backend clients shared by all sessions
#[derive(Clone)]
pub struct ShellServices {
    pub sync: Arc<ConfigSyncClient>,
    pub schema: Arc<SchemaIntrospector>,
    pub options: ShellOptions,
}

impl ShellServices {
    /// Build both clients over one transport
    pub fn new(transport: Arc<dyn GraphqlTransport>, options: ShellOptions) -> Self {
        Self {
            sync: Arc::new(ConfigSyncClient::new(Arc::clone(&transport))),
            schema: Arc::new(SchemaIntrospector::new(transport)),
            options,
        }
    }
}

/// Modal dialog currently open
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "modal", rename_all = "snake_case")]
pub enum Modal {
    #[default]
    None,
    ManageDashboards { mode: ManageMode },
    GlobalSettings,
    EditElement { element: Element },
}

/// Everything the page renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellView {
    pub user_id: UserId,
    pub locale: Locale,
    pub header: HeaderView,
    pub sidebar: SidebarView,
    pub workspace: WorkspaceState,
    pub content: WorkspaceView,
    pub modal: Modal,
    pub persist: PersistStatus,
}

pub struct ShellSession {
    user: SessionUser,
    services: ShellServices,
    store: UserConfigStore,
    persister: ConfigPersister,
    tables: Option<Vec<String>>,
    workspace: WorkspaceStateMachine,
    sidebar: NavigationSidebar,
    translator: Translator,
    modal: Modal,
}

impl ShellSession {
    /// Open a session and load its data
    ///
    /// Load failures are logged and leave the affected data unset.
    pub async fn open(services: ShellServices, claims: SessionClaims) -> Self {
        let user = SessionUser::from_claims(claims, services.options.fallback_user_id);
        let store = UserConfigStore::new();
        let persister =
            ConfigPersister::spawn(Arc::clone(&services.sync), user.id, store.pending_edits());

        let mut session = Self {
            user,
            services,
            store,
            persister,
            tables: None,
            workspace: WorkspaceStateMachine::new(),
            sidebar: NavigationSidebar::new(),
            translator: Translator::new(Locale::default()),
            modal: Modal::None,
        };
        session.reload().await;

        tracing::info!(
            user_id = session.user.id,
            config_loaded = session.store.is_loaded(),
            tables_loaded = session.tables.is_some(),
            "Shell session opened"
        );
        session
    }

    /// Fetch the configuration and the table list again
    ///
    /// Both requests run concurrently. Data from an earlier successful load
    /// is kept when a request fails. Staged edits are flushed first; if they
    /// cannot be stored the local configuration stays ahead of the backend
    /// and the fetched version is discarded.
    pub async fn reload(&mut self) {
        let user_id = self.user.id;
        let flushed = self.flush(self.services.options.flush_timeout).await;

        let (config, tables) = tokio::join!(
            self.services.sync.fetch_latest(user_id),
            self.services.schema.list_base_tables()
        );

        match config {
            Ok(_) if !flushed => tracing::warn!(
                user_id,
                generation = self.store.last_generation(),
                "Local configuration has unsaved edits, keeping it over the stored version"
            ),
            Ok(config) => {
                self.translator =
                    Translator::new(Locale::from_code_or_default(&config.ui_preferences.language));
                self.store.load(config);
            }
            Err(e) => tracing::error!(user_id, error = %e, "Failed to load user configuration"),
        }

        match tables {
            Ok(tables) => self.tables = Some(tables),
            Err(e) => tracing::error!(user_id, error = %e, "Failed to list base tables"),
        }
        self.sidebar.invalidate();
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn config(&self) -> Option<&UserConfiguration> {
        self.store.config()
    }

    pub fn tables(&self) -> Option<&[String]> {
        self.tables.as_deref()
    }

    pub fn workspace(&self) -> &WorkspaceState {
        self.workspace.state()
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn locale(&self) -> Locale {
        self.translator.locale()
    }

    /// Build the full page view
    pub fn view(&mut self) -> ShellView {
        let state = self.workspace.state().clone();
        let options = &self.services.options;

        let sidebar = if state.is_editing() {
            SidebarView::EditMode
        } else {
            let dashboards = self.store.dashboard_names();
            match self
                .sidebar
                .model(self.tables.as_deref(), &dashboards, self.translator)
            {
                Some(model) => SidebarView::Navigation(model),
                None => SidebarView::Loading,
            }
        };

        let language = self
            .store
            .config()
            .map(|c| Locale::from_code_or_default(&c.ui_preferences.language));

        ShellView {
            user_id: self.user.id,
            locale: self.translator.locale(),
            header: HeaderView::build(
                &options.logo_src,
                &state,
                &self.user,
                language,
                self.translator,
            ),
            sidebar,
            content: render(&state, self.store.config(), options.media_display),
            workspace: state,
            modal: self.modal.clone(),
            persist: self.persister.status(),
        }
    }

    /// Handle a sidebar click
    pub fn click_sidebar(&mut self, group: SidebarGroup, key: &str) {
        match SidebarSelection::from_click(group, key) {
            SidebarSelection::BaseTable(name) => self.select_base_table(&name),
            SidebarSelection::Dashboard(_) => {
                self.select_dashboard(key);
            }
        }
    }

    pub fn select_base_table(&mut self, name: &str) {
        self.workspace.select_base_table(name);
    }

    /// Select a dashboard, or open the management modal for reserved keys
    pub fn select_dashboard(&mut self, key: &str) -> DashboardSelection {
        let selection = self.workspace.select_dashboard(key);
        if let DashboardSelection::Manage(mode) = selection {
            self.modal = Modal::ManageDashboards { mode };
        }
        selection
    }

    pub fn toggle_edit_mode(&mut self) -> &WorkspaceState {
        self.workspace.toggle_edit_mode()
    }

    /// Switch the UI locale and store it as the preferred language
    ///
    /// Returns the route the client navigates to. The preference is not
    /// written when no configuration is loaded.
    pub fn change_locale(&mut self, locale: Locale, current_path: &str) -> RouteUpdate {
        self.translator = Translator::new(locale);

        let stored = self.store.edit(|c| {
            c.set_language(locale.code());
            Ok(())
        });
        if let Err(e) = stored {
            tracing::warn!(
                user_id = self.user.id,
                %locale,
                error = %e,
                "Language preference not stored"
            );
        }

        Route::parse(current_path).with_locale(locale)
    }

    /// Append an empty dashboard and close the management modal
    pub fn add_dashboard(&mut self, name: &str) -> ShellResult<()> {
        let added = self
            .store
            .edit(|c| c.add_dashboard(name).map(|d| d.name.clone()))?;

        tracing::info!(user_id = self.user.id, dashboard = %added, "Dashboard added");
        self.modal = Modal::None;
        Ok(())
    }

    /// Remove a dashboard and close the management modal
    ///
    /// The workspace returns to `Empty` when the removed dashboard was shown.
    pub fn remove_dashboard(&mut self, name: &str) -> ShellResult<()> {
        self.store
            .edit(|c| c.remove_dashboard(name).map(|_| ()))?;

        let state = self.workspace.state();
        if state.shows_dashboard() && state.name() == name {
            self.workspace.clear();
        }

        tracing::info!(user_id = self.user.id, dashboard = name, "Dashboard removed");
        self.modal = Modal::None;
        Ok(())
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::None;
    }

    /// Open the global settings modal; admins only
    pub fn open_global_settings(&mut self) -> ShellResult<()> {
        if !self.user.is_admin() {
            tracing::warn!(user_id = self.user.id, "Global settings refused for non-admin");
            return Err(ShellError::Forbidden);
        }
        self.modal = Modal::GlobalSettings;
        Ok(())
    }

    /// Replace or append an element of the dashboard being edited
    ///
    /// Returns true when an existing element was replaced.
    pub fn upsert_element(&mut self, element: Element) -> ShellResult<bool> {
        let dashboard = self.editing_dashboard()?;

        let replaced = self.store.edit(|c| {
            c.dashboard_mut(&dashboard)
                .ok_or_else(|| ConfigEditError::DashboardNotFound(dashboard.clone()))
                .map(|d| d.upsert_element(element))
        })?;

        if matches!(self.modal, Modal::EditElement { .. }) {
            self.modal = Modal::None;
        }
        Ok(replaced)
    }

    /// Remove an element from the dashboard being edited
    pub fn remove_element(&mut self, name: &str) -> ShellResult<()> {
        let dashboard = self.editing_dashboard()?;

        self.store.edit(|c| {
            c.dashboard_mut(&dashboard)
                .ok_or_else(|| ConfigEditError::DashboardNotFound(dashboard.clone()))?
                .remove_element(name)
                .map(|_| ())
        })?;
        Ok(())
    }

    /// Open the element editor for an element of the dashboard being edited
    pub fn edit_element(&mut self, name: &str) -> ShellResult<()> {
        let dashboard = self.editing_dashboard()?;
        if !self.store.is_loaded() {
            return Err(ShellError::ConfigNotLoaded);
        }

        let element = self
            .store
            .dashboard(&dashboard)
            .ok_or_else(|| ConfigEditError::DashboardNotFound(dashboard.clone()))?
            .find_element(name)
            .cloned()
            .ok_or_else(|| ConfigEditError::ElementNotFound {
                dashboard: dashboard.clone(),
                element: name.to_string(),
            })?;

        self.modal = Modal::EditElement { element };
        Ok(())
    }

    /// Whether an edit is staged but not yet stored
    pub fn has_pending_edits(&self) -> bool {
        self.store.has_pending()
    }

    pub fn persist_status(&self) -> PersistStatus {
        self.persister.status()
    }

    /// Wait for the newest staged edit to be stored
    ///
    /// Returns true when nothing is left staged.
    pub async fn flush(&self, timeout: Duration) -> bool {
        if !self.store.has_pending() {
            return true;
        }

        let generation = self.store.last_generation();
        if !self.persister.wait_for(generation, timeout).await {
            tracing::warn!(user_id = self.user.id, generation, "Timed out flushing configuration");
        }
        !self.store.has_pending()
    }

    fn editing_dashboard(&self) -> ShellResult<String> {
        match self.workspace.state() {
            WorkspaceState::EditDashboard(name) => Ok(name.clone()),
            _ => Err(ShellError::NotEditing),
        }
    }
}
