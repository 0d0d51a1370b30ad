//! User Configuration
//!
//! The per-user configuration document (dashboards, UI preferences, base
//! table metadata) and the in-memory store that stages edits for persistence.
//!
//! - **types**: Persisted data model
//! - **store**: `UserConfigStore` and the staged-edit mailbox
//! - **error**: Edit and store errors

pub mod error;
pub mod store;
pub mod types;

pub use error::{ConfigEditError, StoreError};
pub use store::{PendingEdit, PendingEdits, UserConfigStore};
pub use types::{
    BaseTableConfig, Dashboard, Element, ElementKind, ElementType, TableOrdering,
    UiPreferences, UserConfiguration, DASHBOARD_ADD_KEY, DASHBOARD_REMOVE_KEY, DEFAULT_LANGUAGE,
    DEFAULT_ROWS_PER_PAGE,
};
