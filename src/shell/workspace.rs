//! Workspace state machine
//!
//! Tracks what the workspace shows: nothing, a base table, or a dashboard in
//! display or edit mode. The state lives for the whole session and is never
//! persisted.
//!
//! ```text
//!            select_base_table(n)            select_dashboard(n)
//!   Empty ─────────────────────► BaseTable ─────────────────────► DisplayDashboard
//!     │                                                               ▲     │
//!     └──────────────── toggle_edit_mode ─────────────────────────────┘     │ toggle
//!                                                                           ▼
//!                                                                    EditDashboard
//! ```

use serde::Serialize;

pub use crate::userconfig::{DASHBOARD_ADD_KEY, DASHBOARD_REMOVE_KEY};

/// What the workspace currently displays
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(
    tag = "displaying",
    content = "name",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum WorkspaceState {
    #[default]
    Empty,
    BaseTable(String),
    DisplayDashboard(String),
    EditDashboard(String),
}

/// Discriminant of [`WorkspaceState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Displaying {
    Empty,
    BaseTable,
    DisplayDashboard,
    EditDashboard,
}

impl WorkspaceState {
    /// Name of the active entity; empty for [`WorkspaceState::Empty`]
    pub fn name(&self) -> &str {
        match self {
            WorkspaceState::Empty => "",
            WorkspaceState::BaseTable(name)
            | WorkspaceState::DisplayDashboard(name)
            | WorkspaceState::EditDashboard(name) => name,
        }
    }

    pub fn displaying(&self) -> Displaying {
        match self {
            WorkspaceState::Empty => Displaying::Empty,
            WorkspaceState::BaseTable(_) => Displaying::BaseTable,
            WorkspaceState::DisplayDashboard(_) => Displaying::DisplayDashboard,
            WorkspaceState::EditDashboard(_) => Displaying::EditDashboard,
        }
    }

    /// Whether a dashboard is shown, in either mode
    pub fn shows_dashboard(&self) -> bool {
        matches!(
            self,
            WorkspaceState::DisplayDashboard(_) | WorkspaceState::EditDashboard(_)
        )
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, WorkspaceState::EditDashboard(_))
    }
}

/// Mode of the dashboard-management modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ManageMode {
    Add,
    Remove,
}

/// Meaning of a key picked in the dashboard sidebar section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardSelection {
    /// An ordinary dashboard name
    Display(String),
    /// One of the reserved management entries
    Manage(ManageMode),
}

impl DashboardSelection {
    pub fn from_key(key: &str) -> Self {
        match key {
            DASHBOARD_ADD_KEY => DashboardSelection::Manage(ManageMode::Add),
            DASHBOARD_REMOVE_KEY => DashboardSelection::Manage(ManageMode::Remove),
            name => DashboardSelection::Display(name.to_string()),
        }
    }
}

/// Owns the workspace state for one session
#[derive(Debug, Clone, Default)]
pub struct WorkspaceStateMachine {
    state: WorkspaceState,
}

impl WorkspaceStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    /// Show a base table
    pub fn select_base_table(&mut self, name: impl Into<String>) -> &WorkspaceState {
        self.transition(WorkspaceState::BaseTable(name.into()))
    }

    /// Handle a dashboard sidebar key
    ///
    /// Reserved management keys leave the state untouched and are returned
    /// as [`DashboardSelection::Manage`] so the caller can open the modal.
    /// Names with no matching dashboard still transition; rendering shows
    /// them as missing.
    pub fn select_dashboard(&mut self, key: &str) -> DashboardSelection {
        let selection = DashboardSelection::from_key(key);
        if let DashboardSelection::Display(name) = &selection {
            self.transition(WorkspaceState::DisplayDashboard(name.clone()));
        }
        selection
    }

    /// Toggle between display and edit mode
    ///
    /// Only `DisplayDashboard` enters edit mode. Every other state, `Empty`
    /// and `BaseTable` included, becomes `DisplayDashboard` with the current
    /// name.
    pub fn toggle_edit_mode(&mut self) -> &WorkspaceState {
        let next = match &self.state {
            WorkspaceState::DisplayDashboard(name) => WorkspaceState::EditDashboard(name.clone()),
            other => WorkspaceState::DisplayDashboard(other.name().to_string()),
        };
        self.transition(next)
    }

    /// Return to `Empty`
    pub fn clear(&mut self) -> &WorkspaceState {
        self.transition(WorkspaceState::Empty)
    }

    fn transition(&mut self, next: WorkspaceState) -> &WorkspaceState {
        tracing::debug!(from = ?self.state, to = ?next, "Workspace transition");
        self.state = next;
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_empty() {
        let machine = WorkspaceStateMachine::new();
        assert_eq!(machine.state(), &WorkspaceState::Empty);
        assert_eq!(machine.state().name(), "");
    }

    #[test]
    fn test_select_base_table_from_any_state() {
        let mut machine = WorkspaceStateMachine::new();
        machine.select_dashboard("Sales");
        machine.toggle_edit_mode();

        let state = machine.select_base_table("Product");
        assert_eq!(state, &WorkspaceState::BaseTable("Product".to_string()));
    }

    #[test]
    fn test_reserved_keys_do_not_transition() {
        let mut machine = WorkspaceStateMachine::new();

        let selection = machine.select_dashboard(DASHBOARD_ADD_KEY);
        assert_eq!(selection, DashboardSelection::Manage(ManageMode::Add));
        assert_eq!(machine.state().displaying(), Displaying::Empty);

        machine.select_base_table("Order");
        let selection = machine.select_dashboard(DASHBOARD_REMOVE_KEY);
        assert_eq!(selection, DashboardSelection::Manage(ManageMode::Remove));
        assert_eq!(machine.state(), &WorkspaceState::BaseTable("Order".to_string()));
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut machine = WorkspaceStateMachine::new();
        machine.select_dashboard("X");

        assert_eq!(
            machine.toggle_edit_mode(),
            &WorkspaceState::EditDashboard("X".to_string())
        );
        assert_eq!(
            machine.toggle_edit_mode(),
            &WorkspaceState::DisplayDashboard("X".to_string())
        );
    }

    #[test]
    fn test_toggle_from_non_display_states() {
        let mut machine = WorkspaceStateMachine::new();
        assert_eq!(
            machine.toggle_edit_mode(),
            &WorkspaceState::DisplayDashboard(String::new())
        );

        machine.select_base_table("Product");
        assert_eq!(
            machine.toggle_edit_mode(),
            &WorkspaceState::DisplayDashboard("Product".to_string())
        );
    }

    #[test]
    fn test_unknown_dashboard_still_transitions() {
        let mut machine = WorkspaceStateMachine::new();
        let selection = machine.select_dashboard("Nope");
        assert_eq!(selection, DashboardSelection::Display("Nope".to_string()));
        assert!(machine.state().shows_dashboard());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(WorkspaceState::EditDashboard("X".to_string())).unwrap();
        assert_eq!(json["displaying"], "EDIT_DASHBOARD");
        assert_eq!(json["name"], "X");

        let json = serde_json::to_value(WorkspaceState::Empty).unwrap();
        assert_eq!(json["displaying"], "EMPTY");
    }
}
