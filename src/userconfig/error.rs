//! User configuration error types

use thiserror::Error;

/// Errors raised when an edit cannot be applied to a configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigEditError {
    /// Dashboard or element names must contain a visible character
    #[error("Name must not be empty")]
    EmptyName,

    /// Dashboard names are selection keys and must be unique
    #[error("Dashboard already exists: {0}")]
    DuplicateDashboard(String),

    /// Name collides with a sidebar management key
    #[error("Dashboard name is reserved: {0}")]
    ReservedName(String),

    /// Requested dashboard does not exist
    #[error("Dashboard not found: {0}")]
    DashboardNotFound(String),

    /// Requested element does not exist in the dashboard
    #[error("Element '{element}' not found in dashboard '{dashboard}'")]
    ElementNotFound { dashboard: String, element: String },
}

/// Errors raised by the in-memory configuration store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No configuration has been loaded yet
    #[error("User configuration is not loaded")]
    NotLoaded,

    /// The edit was rejected; the store is unchanged
    #[error(transparent)]
    Edit(#[from] ConfigEditError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigEditError::DuplicateDashboard("Sales".to_string());
        assert_eq!(err.to_string(), "Dashboard already exists: Sales");

        let err = StoreError::from(ConfigEditError::ElementNotFound {
            dashboard: "Ops".to_string(),
            element: "note".to_string(),
        });
        assert_eq!(err.to_string(), "Element 'note' not found in dashboard 'Ops'");
    }
}
