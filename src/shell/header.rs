//! Header bar view model

use serde::Serialize;

use super::i18n::{Locale, Translator};
use super::workspace::WorkspaceState;
use crate::auth::SessionUser;

/// URL the logout action returns to
pub const LOGOUT_CALLBACK_URL: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoView {
    pub src: String,
    pub alt: String,
}

/// Edit-mode toggle; shown only while a dashboard is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GearView {
    /// Rendered rotated while the dashboard is in edit mode
    pub rotated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageOption {
    pub locale: Locale,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "item", rename_all = "camelCase")]
pub enum UserMenuItem {
    #[serde(rename_all = "camelCase")]
    Logout { label: String, callback_url: String },
    GlobalSettings { label: String },
    Language {
        label: String,
        selected: Locale,
        options: Vec<LanguageOption>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderView {
    pub logo: LogoView,
    pub gear: Option<GearView>,
    pub user_menu: Vec<UserMenuItem>,
}

impl HeaderView {
    /// Build the header for the current workspace state
    ///
    /// `language` is the stored UI language, `None` before the
    /// configuration is loaded.
    pub fn build(
        logo_src: &str,
        state: &WorkspaceState,
        user: &SessionUser,
        language: Option<Locale>,
        translator: Translator,
    ) -> Self {
        let gear = state.shows_dashboard().then(|| GearView {
            rotated: state.is_editing(),
        });

        let mut user_menu = vec![UserMenuItem::Logout {
            label: translator.t("logout.button").to_string(),
            callback_url: LOGOUT_CALLBACK_URL.to_string(),
        }];

        if user.is_admin() {
            user_menu.push(UserMenuItem::GlobalSettings {
                label: translator.t("globalSettings.modalTitle").to_string(),
            });
        }

        let options = Locale::all()
            .iter()
            .map(|&locale| LanguageOption {
                locale,
                label: translator.t(language_key(locale)).to_string(),
            })
            .collect();
        user_menu.push(UserMenuItem::Language {
            label: translator.t("logout.language").to_string(),
            selected: language.unwrap_or_default(),
            options,
        });

        Self {
            logo: LogoView {
                src: logo_src.to_string(),
                alt: "MyUI logo".to_string(),
            },
            gear,
            user_menu,
        }
    }
}

fn language_key(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "logout.english",
        Locale::Nl => "logout.dutch",
    }
}
