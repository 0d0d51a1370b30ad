//! Locale-aware route updates
//!
//! Switching locale keeps the current path and query parameters and only
//! changes the locale prefix of the URL.

use serde::Serialize;
use std::collections::BTreeMap;

use super::i18n::Locale;

/// A parsed application path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Path without locale prefix, always starting with `/`
    pub pathname: String,
    /// Decoded query parameters
    pub query: BTreeMap<String, String>,
    /// Raw query string as received, without `?`
    raw_query: Option<String>,
}

impl Route {
    /// Parse a browser path such as `/nl/reports?page=2`
    ///
    /// A leading segment naming a supported locale is stripped.
    pub fn parse(as_path: &str) -> Self {
        let (path, raw_query) = match as_path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (as_path, None),
        };
        let path = path.split('#').next().unwrap_or_default();

        let trimmed = path.trim_start_matches('/');
        let (first, rest) = match trimmed.split_once('/') {
            Some((first, rest)) => (first, Some(rest)),
            None => (trimmed, None),
        };

        let pathname = if first.parse::<Locale>().is_ok() {
            format!("/{}", rest.unwrap_or_default())
        } else {
            format!("/{}", trimmed)
        };

        let raw_query = raw_query
            .map(|q| q.split('#').next().unwrap_or_default())
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        Self {
            pathname,
            query: raw_query.as_deref().map(parse_query).unwrap_or_default(),
            raw_query,
        }
    }

    /// Path plus query, without locale prefix
    pub fn as_path(&self) -> String {
        match &self.raw_query {
            Some(query) => format!("{}?{}", self.pathname, query),
            None => self.pathname.clone(),
        }
    }

    /// The same route under another locale
    pub fn with_locale(&self, locale: Locale) -> RouteUpdate {
        let as_path = self.as_path();
        let href = if self.pathname == "/" {
            match &self.raw_query {
                Some(query) => format!("/{}?{}", locale.code(), query),
                None => format!("/{}", locale.code()),
            }
        } else {
            format!("/{}{}", locale.code(), as_path)
        };

        RouteUpdate {
            pathname: self.pathname.clone(),
            query: self.query.clone(),
            as_path,
            locale,
            href,
        }
    }
}

/// Client-side navigation instruction returned after a locale switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteUpdate {
    pub pathname: String,
    pub query: BTreeMap<String, String>,
    pub as_path: String,
    pub locale: Locale,
    /// Full URL to navigate to
    pub href: String,
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(component: &str) -> String {
    let component = component.replace('+', " ");
    match urlencoding::decode(&component) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => component,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_locale_prefix() {
        let route = Route::parse("/en/reports/q1?page=2&name=a%20b");
        assert_eq!(route.pathname, "/reports/q1");
        assert_eq!(route.query.get("page").map(String::as_str), Some("2"));
        assert_eq!(route.query.get("name").map(String::as_str), Some("a b"));
        assert_eq!(route.as_path(), "/reports/q1?page=2&name=a%20b");
    }

    #[test]
    fn test_parse_without_locale() {
        let route = Route::parse("/reports");
        assert_eq!(route.pathname, "/reports");
        assert!(route.query.is_empty());

        let route = Route::parse("/nl");
        assert_eq!(route.pathname, "/");
    }

    #[test]
    fn test_with_locale_preserves_path_and_query() {
        let update = Route::parse("/en/reports?page=2").with_locale(Locale::Nl);
        assert_eq!(update.href, "/nl/reports?page=2");
        assert_eq!(update.as_path, "/reports?page=2");
        assert_eq!(update.locale, Locale::Nl);
    }

    #[test]
    fn test_with_locale_at_root() {
        assert_eq!(Route::parse("/").with_locale(Locale::En).href, "/en");
        assert_eq!(Route::parse("/nl?x=1").with_locale(Locale::En).href, "/en?x=1");
    }
}
