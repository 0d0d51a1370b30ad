//! Application shell
//!
//! Header, navigation sidebar and workspace of the dashboard builder,
//! expressed as state plus serializable view models. A [`ShellSession`]
//! drives one page: it loads the user's configuration and the table list,
//! reacts to user actions and stages configuration edits for persistence.

pub mod header;
pub mod i18n;
pub mod routing;
pub mod session;
pub mod sidebar;
pub mod view;
pub mod workspace;

pub use header::{GearView, HeaderView, UserMenuItem};
pub use i18n::{Locale, Translator};
pub use routing::{Route, RouteUpdate};
pub use session::{
    Modal, ShellError, ShellOptions, ShellResult, ShellServices, ShellSession, ShellView,
};
pub use sidebar::{NavigationSidebar, SidebarGroup, SidebarModel, SidebarSelection, SidebarView};
pub use view::{render, MediaDisplay, WorkspaceView};
pub use workspace::{
    DashboardSelection, Displaying, ManageMode, WorkspaceState, WorkspaceStateMachine,
    DASHBOARD_ADD_KEY, DASHBOARD_REMOVE_KEY,
};
