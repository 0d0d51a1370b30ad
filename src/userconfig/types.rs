//! User configuration data model
//!
//! The persisted shape of a user's configuration:
//! - `UserConfiguration`: root document (preferences, base tables, dashboards)
//! - `Dashboard`: a named grid of elements
//! - `Element`: one widget on the grid, either a data grid or static content
//!
//! Every field carries a serde default so older or partial documents are
//! merged with the defaults on read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::ConfigEditError;

/// Language used when a document carries no preference
pub const DEFAULT_LANGUAGE: &str = "nl";

/// Rows shown by a grid element that does not specify `rowsPerPage`
pub const DEFAULT_ROWS_PER_PAGE: u32 = 10;

/// Sidebar key that opens the add-dashboard modal
pub const DASHBOARD_ADD_KEY: &str = "dashboardAdd";

/// Sidebar key that opens the remove-dashboard modal
pub const DASHBOARD_REMOVE_KEY: &str = "dashboardDelete";

/// Root persisted entity: one snapshot of a user's configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfiguration {
    #[serde(default)]
    pub ui_preferences: UiPreferences,
    #[serde(default)]
    pub base_tables: Vec<BaseTableConfig>,
    #[serde(default)]
    pub dashboards: Vec<Dashboard>,
}

impl Default for UserConfiguration {
    /// The configuration used for users with no stored version
    fn default() -> Self {
        let mut column_names = BTreeMap::new();
        column_names.insert("key0".to_string(), "someTitle".to_string());
        column_names.insert("key1".to_string(), "someTitle".to_string());

        Self {
            ui_preferences: UiPreferences::default(),
            base_tables: vec![BaseTableConfig {
                name: "table1".to_string(),
                column_names,
                ordering: TableOrdering {
                    by: "someKey".to_string(),
                    ascending: false,
                    ordered: false,
                },
            }],
            dashboards: Vec::new(),
        }
    }
}

impl UserConfiguration {
    /// Dashboard names in configuration order
    pub fn dashboard_names(&self) -> Vec<String> {
        self.dashboards.iter().map(|d| d.name.clone()).collect()
    }

    /// Look up a dashboard by name. The first match wins.
    pub fn dashboard(&self, name: &str) -> Option<&Dashboard> {
        self.dashboards.iter().find(|d| d.name == name)
    }

    /// Mutable lookup of a dashboard by name
    pub fn dashboard_mut(&mut self, name: &str) -> Option<&mut Dashboard> {
        self.dashboards.iter_mut().find(|d| d.name == name)
    }

    /// Look up base table metadata by table name
    pub fn base_table(&self, name: &str) -> Option<&BaseTableConfig> {
        self.base_tables.iter().find(|t| t.name == name)
    }

    /// Append a new, empty dashboard
    ///
    /// The name is trimmed and must be non-empty and unique.
    pub fn add_dashboard(&mut self, name: &str) -> Result<&Dashboard, ConfigEditError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigEditError::EmptyName);
        }
        if name == DASHBOARD_ADD_KEY || name == DASHBOARD_REMOVE_KEY {
            return Err(ConfigEditError::ReservedName(name.to_string()));
        }
        if self.dashboard(name).is_some() {
            return Err(ConfigEditError::DuplicateDashboard(name.to_string()));
        }

        self.dashboards.push(Dashboard::new(name));
        Ok(&self.dashboards[self.dashboards.len() - 1])
    }

    /// Remove a dashboard by name, returning it
    pub fn remove_dashboard(&mut self, name: &str) -> Result<Dashboard, ConfigEditError> {
        let index = self
            .dashboards
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| ConfigEditError::DashboardNotFound(name.to_string()))?;
        Ok(self.dashboards.remove(index))
    }

    /// Set the preferred UI language
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.ui_preferences.language = language.into();
    }
}

/// UI preferences stored with the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPreferences {
    /// Locale code such as "en" or "nl"
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

/// Display metadata for one base table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseTableConfig {
    pub name: String,
    /// Column key to display title
    #[serde(default)]
    pub column_names: BTreeMap<String, String>,
    #[serde(default)]
    pub ordering: TableOrdering,
}

/// Ordering applied when a base table is displayed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOrdering {
    #[serde(default)]
    pub by: String,
    #[serde(default)]
    pub ascending: bool,
    #[serde(default)]
    pub ordered: bool,
}

/// A named arrangement of elements on a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub name: String,
    #[serde(default)]
    pub dashboard_elements: Vec<Element>,
}

impl Dashboard {
    /// Create an empty dashboard
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dashboard_elements: Vec::new(),
        }
    }

    /// Builder method: add an element
    pub fn element(mut self, element: Element) -> Self {
        self.dashboard_elements.push(element);
        self
    }

    /// Find an element by name
    pub fn find_element(&self, name: &str) -> Option<&Element> {
        self.dashboard_elements.iter().find(|e| e.name == name)
    }

    /// Replace the element with the same name, or append it
    ///
    /// Returns true when an existing element was replaced.
    pub fn upsert_element(&mut self, element: Element) -> bool {
        match self
            .dashboard_elements
            .iter_mut()
            .find(|e| e.name == element.name)
        {
            Some(existing) => {
                *existing = element;
                true
            }
            None => {
                self.dashboard_elements.push(element);
                false
            }
        }
    }

    /// Remove an element by name
    pub fn remove_element(&mut self, name: &str) -> Result<Element, ConfigEditError> {
        let index = self
            .dashboard_elements
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| ConfigEditError::ElementNotFound {
                dashboard: self.name.clone(),
                element: name.to_string(),
            })?;
        Ok(self.dashboard_elements.remove(index))
    }
}

/// One widget placed on a dashboard grid
///
/// Positions and sizes are in grid units. Stored flat with a numeric `type`
/// discriminant; see [`RawElement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawElement", into = "RawElement")]
pub struct Element {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub kind: ElementKind,
}

/// Variant-specific element content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// Paged data grid over a query
    GridView { query: String, rows_per_page: u32 },
    /// Literal text, or a media URL
    Static { text: String },
}

impl Element {
    /// Create a grid element
    pub fn grid(name: impl Into<String>, query: impl Into<String>, rows_per_page: u32) -> Self {
        Self {
            name: name.into(),
            x: 0,
            y: 0,
            w: 6,
            h: 9,
            kind: ElementKind::GridView {
                query: query.into(),
                rows_per_page,
            },
        }
    }

    /// Create a static element
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x: 0,
            y: 0,
            w: 6,
            h: 9,
            kind: ElementKind::Static { text: text.into() },
        }
    }

    /// Builder method: set grid position
    pub fn at(mut self, x: u32, y: u32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Builder method: set grid size
    pub fn size(mut self, w: u32, h: u32) -> Self {
        self.w = w;
        self.h = h;
        self
    }

    pub fn element_type(&self) -> ElementType {
        match self.kind {
            ElementKind::GridView { .. } => ElementType::GridView,
            ElementKind::Static { .. } => ElementType::Static,
        }
    }
}

/// Stored element discriminant: `0` grid view, `1` static
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ElementType {
    GridView,
    Static,
}

impl TryFrom<u8> for ElementType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ElementType::GridView),
            1 => Ok(ElementType::Static),
            other => Err(format!("unknown element type {}", other)),
        }
    }
}

impl From<ElementType> for u8 {
    fn from(value: ElementType) -> Self {
        match value {
            ElementType::GridView => 0,
            ElementType::Static => 1,
        }
    }
}

/// Flat storage form of an [`Element`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawElement {
    pub name: String,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default)]
    pub w: u32,
    #[serde(default)]
    pub h: u32,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl TryFrom<RawElement> for Element {
    type Error = String;

    fn try_from(raw: RawElement) -> Result<Self, Self::Error> {
        let kind = match raw.element_type {
            ElementType::GridView => {
                let query = raw
                    .query
                    .ok_or_else(|| format!("grid element '{}' has no query", raw.name))?;
                let rows_per_page = raw.rows_per_page.unwrap_or(DEFAULT_ROWS_PER_PAGE);
                if rows_per_page == 0 {
                    return Err(format!(
                        "grid element '{}' must show at least one row per page",
                        raw.name
                    ));
                }
                ElementKind::GridView {
                    query,
                    rows_per_page,
                }
            }
            ElementType::Static => ElementKind::Static {
                text: raw
                    .text
                    .ok_or_else(|| format!("static element '{}' has no text", raw.name))?,
            },
        };

        Ok(Element {
            name: raw.name,
            x: raw.x,
            y: raw.y,
            w: raw.w,
            h: raw.h,
            kind,
        })
    }
}

impl From<Element> for RawElement {
    fn from(element: Element) -> Self {
        let element_type = element.element_type();
        let (query, rows_per_page, text) = match element.kind {
            ElementKind::GridView {
                query,
                rows_per_page,
            } => (Some(query), Some(rows_per_page), None),
            ElementKind::Static { text } => (None, None, Some(text)),
        };

        RawElement {
            name: element.name,
            x: element.x,
            y: element.y,
            w: element.w,
            h: element.h,
            element_type,
            query,
            rows_per_page,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_dashboard_rejects_sidebar_keys() {
        let mut config = UserConfiguration::default();
        assert_eq!(
            config.add_dashboard(DASHBOARD_ADD_KEY).unwrap_err(),
            ConfigEditError::ReservedName(DASHBOARD_ADD_KEY.to_string())
        );
        assert!(config.add_dashboard(" dashboardDelete ").is_err());
        assert!(config.dashboards.is_empty());
    }

    #[test]
    fn test_default_configuration() {
        let config = UserConfiguration::default();
        assert_eq!(config.ui_preferences.language, "nl");
        assert!(config.dashboards.is_empty());
        assert_eq!(config.base_tables.len(), 1);
        assert_eq!(config.base_tables[0].name, "table1");
        assert!(!config.base_tables[0].ordering.ordered);
    }

    #[test]
    fn test_missing_keys_merge_defaults() {
        let config: UserConfiguration = serde_json::from_str(r#"{"dashboards": []}"#).unwrap();
        assert_eq!(config.ui_preferences.language, DEFAULT_LANGUAGE);
        assert!(config.base_tables.is_empty());

        let config: UserConfiguration =
            serde_json::from_str(r#"{"uiPreferences": {}, "dashboards": [{"name": "Sales"}]}"#)
                .unwrap();
        assert_eq!(config.ui_preferences.language, DEFAULT_LANGUAGE);
        assert!(config.dashboards[0].dashboard_elements.is_empty());
    }

    #[test]
    fn test_parse_stored_elements() {
        let json = r#"{
            "name": "Cool Dashboard",
            "dashboardElements": [
                {"name": "Cool Element", "x": 0, "y": 0, "w": 6, "h": 9,
                 "rowsPerPage": 5, "query": "query MyQuery { Product { id } }", "type": 0},
                {"name": "Text Element", "x": 6, "y": 0, "w": 6, "h": 9,
                 "text": "Some text", "type": 1}
            ]
        }"#;

        let dashboard: Dashboard = serde_json::from_str(json).unwrap();
        assert_eq!(dashboard.dashboard_elements.len(), 2);

        let grid = &dashboard.dashboard_elements[0];
        assert_eq!(grid.element_type(), ElementType::GridView);
        assert_eq!(
            grid.kind,
            ElementKind::GridView {
                query: "query MyQuery { Product { id } }".to_string(),
                rows_per_page: 5,
            }
        );

        let text = &dashboard.dashboard_elements[1];
        assert_eq!(text.x, 6);
        assert_eq!(
            text.kind,
            ElementKind::Static {
                text: "Some text".to_string()
            }
        );
    }

    #[test]
    fn test_element_serializes_flat() {
        let element = Element::text("Video", "https://example.com/v.mp4").at(0, 9);
        let value = serde_json::to_value(&element).unwrap();

        assert_eq!(value["type"], 1);
        assert_eq!(value["y"], 9);
        assert_eq!(value["text"], "https://example.com/v.mp4");
        assert!(value.get("query").is_none());
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_grid_element_validation() {
        let missing_query = r#"{"name": "g", "type": 0}"#;
        assert!(serde_json::from_str::<Element>(missing_query).is_err());

        let zero_rows = r#"{"name": "g", "type": 0, "query": "q", "rowsPerPage": 0}"#;
        assert!(serde_json::from_str::<Element>(zero_rows).is_err());

        let default_rows: Element =
            serde_json::from_str(r#"{"name": "g", "type": 0, "query": "q"}"#).unwrap();
        assert_eq!(
            default_rows.kind,
            ElementKind::GridView {
                query: "q".to_string(),
                rows_per_page: DEFAULT_ROWS_PER_PAGE,
            }
        );

        let unknown_type = r#"{"name": "g", "type": 7, "text": "t"}"#;
        assert!(serde_json::from_str::<Element>(unknown_type).is_err());
    }

    #[test]
    fn test_add_dashboard_rejects_duplicates() {
        let mut config = UserConfiguration::default();
        config.add_dashboard("  Sales ").unwrap();
        assert_eq!(config.dashboard_names(), vec!["Sales"]);

        let err = config.add_dashboard("Sales").unwrap_err();
        assert!(matches!(err, ConfigEditError::DuplicateDashboard(_)));

        let err = config.add_dashboard("   ").unwrap_err();
        assert!(matches!(err, ConfigEditError::EmptyName));
    }

    #[test]
    fn test_dashboard_lookup_first_match_wins() {
        let mut config = UserConfiguration::default();
        config
            .dashboards
            .push(Dashboard::new("Twin").element(Element::text("a", "first")));
        config
            .dashboards
            .push(Dashboard::new("Twin").element(Element::text("b", "second")));

        let found = config.dashboard("Twin").unwrap();
        assert!(found.find_element("a").is_some());
        assert!(config.dashboard("Nope").is_none());
    }

    #[test]
    fn test_remove_dashboard() {
        let mut config = UserConfiguration::default();
        config.add_dashboard("One").unwrap();
        config.add_dashboard("Two").unwrap();

        let removed = config.remove_dashboard("One").unwrap();
        assert_eq!(removed.name, "One");
        assert_eq!(config.dashboard_names(), vec!["Two"]);

        assert!(matches!(
            config.remove_dashboard("One"),
            Err(ConfigEditError::DashboardNotFound(_))
        ));
    }

    #[test]
    fn test_upsert_and_remove_element() {
        let mut dashboard = Dashboard::new("Ops");
        assert!(!dashboard.upsert_element(Element::text("note", "v1")));
        assert!(dashboard.upsert_element(Element::text("note", "v2").at(3, 4)));
        assert_eq!(dashboard.dashboard_elements.len(), 1);
        assert_eq!(dashboard.find_element("note").unwrap().x, 3);

        dashboard.remove_element("note").unwrap();
        assert!(matches!(
            dashboard.remove_element("note"),
            Err(ConfigEditError::ElementNotFound { .. })
        ));
    }
}
