//! Navigation sidebar
//!
//! Builds the sidebar entries from the known base tables and dashboards and
//! resolves clicks into typed selections. The built model is cached per
//! sidebar instance and reused while the table list is temporarily unknown.

use serde::{Deserialize, Serialize};

use super::i18n::{Locale, Translator};
use super::workspace::{DashboardSelection, DASHBOARD_ADD_KEY, DASHBOARD_REMOVE_KEY};

/// Sidebar section an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SidebarGroup {
    BaseTables,
    Dashboards,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarItem {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarSection {
    pub group: SidebarGroup,
    pub title: String,
    pub items: Vec<SidebarItem>,
}

/// Both navigation sections, base tables first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarModel {
    pub sections: Vec<SidebarSection>,
}

/// What the sidebar area renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "model", rename_all = "snake_case")]
pub enum SidebarView {
    /// Base tables are not known yet
    Loading,
    Navigation(SidebarModel),
    /// A dashboard is being edited
    EditMode,
}

/// A resolved sidebar click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarSelection {
    BaseTable(String),
    Dashboard(DashboardSelection),
}

impl SidebarSelection {
    pub fn from_click(group: SidebarGroup, key: &str) -> Self {
        match group {
            SidebarGroup::BaseTables => SidebarSelection::BaseTable(key.to_string()),
            SidebarGroup::Dashboards => {
                SidebarSelection::Dashboard(DashboardSelection::from_key(key))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    tables: Vec<String>,
    dashboards: Vec<String>,
    locale: Locale,
}

/// Sidebar builder with a last-known-good cache
#[derive(Debug, Default)]
pub struct NavigationSidebar {
    cached: Option<(CacheKey, SidebarModel)>,
}

impl NavigationSidebar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the sidebar for the given inputs
    ///
    /// With `tables` unknown the last built model is returned unchanged, or
    /// `None` if nothing was built yet.
    pub fn model(
        &mut self,
        tables: Option<&[String]>,
        dashboards: &[String],
        translator: Translator,
    ) -> Option<SidebarModel> {
        let Some(tables) = tables else {
            return self.cached.as_ref().map(|(_, model)| model.clone());
        };

        let key = CacheKey {
            tables: tables.to_vec(),
            dashboards: dashboards.to_vec(),
            locale: translator.locale(),
        };

        if let Some((cached_key, model)) = &self.cached {
            if *cached_key == key {
                return Some(model.clone());
            }
        }

        let model = build(tables, dashboards, translator);
        self.cached = Some((key, model.clone()));
        Some(model)
    }

    /// Drop the cached model
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

fn build(tables: &[String], dashboards: &[String], translator: Translator) -> SidebarModel {
    let table_items = tables
        .iter()
        .map(|name| SidebarItem {
            key: name.clone(),
            label: name.clone(),
        })
        .collect();

    let mut dashboard_items: Vec<SidebarItem> = dashboards
        .iter()
        .map(|name| SidebarItem {
            key: name.clone(),
            label: name.clone(),
        })
        .collect();
    dashboard_items.push(SidebarItem {
        key: DASHBOARD_ADD_KEY.to_string(),
        label: translator.t("dashboard.new").to_string(),
    });
    dashboard_items.push(SidebarItem {
        key: DASHBOARD_REMOVE_KEY.to_string(),
        label: translator.t("dashboard.delete").to_string(),
    });

    SidebarModel {
        sections: vec![
            SidebarSection {
                group: SidebarGroup::BaseTables,
                title: translator.t("basetable.sidebar").to_string(),
                items: table_items,
            },
            SidebarSection {
                group: SidebarGroup::Dashboards,
                title: translator.t("dashboard.sidebar").to_string(),
                items: dashboard_items,
            },
        ],
    }
}
