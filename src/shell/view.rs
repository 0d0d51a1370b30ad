//! Workspace view models
//!
//! Turns the workspace state plus the loaded configuration into what the
//! workspace area renders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::workspace::WorkspaceState;
use crate::userconfig::{Dashboard, Element, ElementKind, TableOrdering, UserConfiguration};

/// How static elements holding a media URL are shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaDisplay {
    /// Inline player or image
    #[default]
    Embed,
    /// Plain hyperlink
    Link,
}

impl FromStr for MediaDisplay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "embed" => Ok(MediaDisplay::Embed),
            "link" => Ok(MediaDisplay::Link),
            other => Err(format!("unknown media display '{}'", other)),
        }
    }
}

impl fmt::Display for MediaDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaDisplay::Embed => f.write_str("embed"),
            MediaDisplay::Link => f.write_str("link"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub key: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub name: String,
    /// Titled columns; empty when the table has no stored metadata
    pub columns: Vec<ColumnView>,
    pub ordering: Option<TableOrdering>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementContent {
    #[serde(rename_all = "camelCase")]
    Grid { query: String, rows_per_page: u32 },
    Text { text: String },
    Media { url: String, display: MediaDisplay },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementView {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub content: ElementContent,
}

impl ElementView {
    pub fn from_element(element: &Element, media: MediaDisplay) -> Self {
        let content = match &element.kind {
            ElementKind::GridView {
                query,
                rows_per_page,
            } => ElementContent::Grid {
                query: query.clone(),
                rows_per_page: *rows_per_page,
            },
            ElementKind::Static { text } if is_media_url(text) => ElementContent::Media {
                url: text.trim().to_string(),
                display: media,
            },
            ElementKind::Static { text } => ElementContent::Text { text: text.clone() },
        };

        Self {
            name: element.name.clone(),
            x: element.x,
            y: element.y,
            w: element.w,
            h: element.h,
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub name: String,
    pub editing: bool,
    pub elements: Vec<ElementView>,
}

impl DashboardView {
    fn from_dashboard(dashboard: &Dashboard, editing: bool, media: MediaDisplay) -> Self {
        Self {
            name: dashboard.name.clone(),
            editing,
            elements: dashboard
                .dashboard_elements
                .iter()
                .map(|e| ElementView::from_element(e, media))
                .collect(),
        }
    }
}

/// What the workspace area renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkspaceView {
    /// Nothing selected
    Placeholder,
    /// Configuration needed for this state is not loaded yet
    Loading,
    BaseTable(TableView),
    Dashboard(DashboardView),
    /// The selected dashboard name matches no dashboard
    MissingDashboard { name: String },
}

/// Render the workspace for `state`
pub fn render(
    state: &WorkspaceState,
    config: Option<&UserConfiguration>,
    media: MediaDisplay,
) -> WorkspaceView {
    match state {
        WorkspaceState::Empty => WorkspaceView::Placeholder,
        WorkspaceState::BaseTable(name) => {
            let table = config.and_then(|c| c.base_table(name));
            WorkspaceView::BaseTable(TableView {
                name: name.clone(),
                columns: table
                    .map(|t| {
                        t.column_names
                            .iter()
                            .map(|(key, title)| ColumnView {
                                key: key.clone(),
                                title: title.clone(),
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
                ordering: table.map(|t| t.ordering.clone()),
            })
        }
        WorkspaceState::DisplayDashboard(name) | WorkspaceState::EditDashboard(name) => {
            let Some(config) = config else {
                return WorkspaceView::Loading;
            };
            match config.dashboard(name) {
                Some(dashboard) => WorkspaceView::Dashboard(DashboardView::from_dashboard(
                    dashboard,
                    state.is_editing(),
                    media,
                )),
                None => WorkspaceView::MissingDashboard { name: name.clone() },
            }
        }
    }
}

fn is_media_url(text: &str) -> bool {
    let text = text.trim();
    (text.starts_with("http://") || text.starts_with("https://"))
        && !text.contains(char::is_whitespace)
}
