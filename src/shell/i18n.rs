//! Locales and UI label catalog

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported UI locales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Nl,
}

impl Locale {
    /// All locales in menu order
    pub fn all() -> &'static [Locale] {
        &[Locale::En, Locale::Nl]
    }

    /// Locale code as used in routes and stored preferences
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Nl => "nl",
        }
    }

    /// Parse a locale code, falling back to English for unknown codes
    pub fn from_code_or_default(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "nl" => Ok(Locale::Nl),
            other => Err(format!("unsupported locale '{}'", other)),
        }
    }
}

/// Translates label keys for one locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translator {
    locale: Locale,
}

impl Translator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Translate `key`; unknown keys are returned unchanged
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        let label = match self.locale {
            Locale::En => english(key),
            Locale::Nl => dutch(key),
        };
        label.unwrap_or(key)
    }
}

fn english(key: &str) -> Option<&'static str> {
    Some(match key {
        "basetable.sidebar" => "Base tables",
        "dashboard.sidebar" => "Dashboards",
        "dashboard.new" => "New dashboard",
        "dashboard.delete" => "Delete dashboard",
        "logout.button" => "Log out",
        "logout.language" => "Language",
        "logout.english" => "English",
        "logout.dutch" => "Dutch",
        "globalSettings.modalTitle" => "Global settings",
        _ => return None,
    })
}

fn dutch(key: &str) -> Option<&'static str> {
    Some(match key {
        "basetable.sidebar" => "Basistabellen",
        "dashboard.sidebar" => "Dashboards",
        "dashboard.new" => "Nieuw dashboard",
        "dashboard.delete" => "Dashboard verwijderen",
        "logout.button" => "Uitloggen",
        "logout.language" => "Taal",
        "logout.english" => "Engels",
        "logout.dutch" => "Nederlands",
        "globalSettings.modalTitle" => "Globale instellingen",
        _ => return None,
    })
}
