//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides. The
//! environment is read once, when the configuration is loaded.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::graphql::HasuraConfig;
use crate::shell::{MediaDisplay, ShellOptions};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "MYUI_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub graphql: GraphqlConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GraphQL endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Sent as the admin-secret header when set
    #[serde(default)]
    pub admin_secret: Option<String>,

    #[serde(default = "default_graphql_timeout")]
    pub request_timeout_ms: u64,
}

fn default_endpoint() -> String {
    "http://localhost:8080/v1/graphql".to_string()
}

fn default_graphql_timeout() -> u64 {
    10_000
}

impl Default for GraphqlConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            admin_secret: None,
            request_timeout_ms: default_graphql_timeout(),
        }
    }
}

impl GraphqlConfig {
    pub fn to_hasura(&self) -> HasuraConfig {
        HasuraConfig {
            endpoint: self.endpoint.clone(),
            admin_secret: self.admin_secret.clone().filter(|s| !s.is_empty()),
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Open sessions allowed at once
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Bound on waiting for staged edits when a session closes
    #[serde(default = "default_flush_timeout")]
    pub flush_timeout_ms: u64,

    /// Sessions untouched for this long are flushed and dropped
    #[serde(default = "default_session_idle")]
    pub session_idle_secs: u64,

    /// How often idle sessions are swept
    #[serde(default = "default_session_sweep")]
    pub session_sweep_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_sessions() -> usize {
    1024
}

fn default_flush_timeout() -> u64 {
    5000
}

fn default_session_idle() -> u64 {
    1800
}

fn default_session_sweep() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
            max_sessions: default_max_sessions(),
            flush_timeout_ms: default_flush_timeout(),
            session_idle_secs: default_session_idle(),
            session_sweep_secs: default_session_sweep(),
        }
    }
}

impl ApiConfig {
    /// Socket address string to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        // interval() panics on a zero period
        Duration::from_secs(self.session_sweep_secs.max(1))
    }
}

/// Shell presentation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub media_display: MediaDisplay,

    /// User id for sessions whose claims carry none
    #[serde(default = "default_user_id")]
    pub default_user_id: i64,

    #[serde(default = "default_logo")]
    pub logo: String,
}

fn default_user_id() -> i64 {
    1
}

fn default_logo() -> String {
    "/logo.svg".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            media_display: MediaDisplay::default(),
            default_user_id: default_user_id(),
            logo: default_logo(),
        }
    }
}

impl UiConfig {
    pub fn to_shell_options(&self) -> ShellOptions {
        ShellOptions {
            media_display: self.media_display,
            logo_src: self.logo.clone(),
            fallback_user_id: self.default_user_id,
            ..ShellOptions::default()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `MYUI_CONFIG`, the default locations, or the environment
    pub fn load_default() -> Self {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            match Self::load_with_env(Path::new(&explicit)) {
                Ok(config) => {
                    tracing::info!(path = %explicit, "Loaded config");
                    return config;
                }
                Err(e) => tracing::warn!(error = %e, "Ignoring {}", CONFIG_PATH_ENV),
            }
        }

        let config_paths = [
            dirs::config_dir().map(|p| p.join("myui").join("config.toml")),
            Some(PathBuf::from("/etc/myui/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `MYUI_*` overrides resolved through `lookup`
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("MYUI_GRAPHQL_ENDPOINT") {
            self.graphql.endpoint = endpoint;
        }
        if let Some(secret) = lookup("MYUI_GRAPHQL_ADMIN_SECRET") {
            self.graphql.admin_secret = Some(secret);
        }

        if let Some(host) = lookup("MYUI_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("MYUI_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid MYUI_API_PORT"),
            }
        }

        if let Some(display) = lookup("MYUI_MEDIA_DISPLAY") {
            match display.parse() {
                Ok(d) => self.ui.media_display = d,
                Err(e) => tracing::warn!(error = %e, "Ignoring invalid MYUI_MEDIA_DISPLAY"),
            }
        }
        if let Some(user_id) = lookup("MYUI_DEFAULT_USER_ID") {
            match user_id.parse() {
                Ok(id) => self.ui.default_user_id = id,
                Err(_) => tracing::warn!(value = %user_id, "Ignoring invalid MYUI_DEFAULT_USER_ID"),
            }
        }

        if let Some(level) = lookup("MYUI_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("MYUI_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# MyUI Configuration
#
# Environment variables override these settings:
# - MYUI_GRAPHQL_ENDPOINT
# - MYUI_GRAPHQL_ADMIN_SECRET
# - MYUI_API_HOST
# - MYUI_API_PORT
# - MYUI_MEDIA_DISPLAY
# - MYUI_DEFAULT_USER_ID
# - MYUI_LOG_LEVEL
# - MYUI_LOG_FORMAT

[graphql]
# GraphQL endpoint serving the versioned user configuration
endpoint = "http://localhost:8080/v1/graphql"

# Admin secret sent with every request
# admin_secret = ""

# Request timeout in milliseconds
request_timeout_ms = 10000

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 3000

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds
request_timeout_secs = 30

# Maximum number of open shell sessions
max_sessions = 1024

# How long closing a session waits for unsaved edits (ms)
flush_timeout_ms = 5000

# Sessions idle this long are flushed and closed (seconds)
session_idle_secs = 1800

# How often idle sessions are swept (seconds)
session_sweep_secs = 60

[ui]
# Media elements: embed (inline) or link
media_display = "embed"

# User id for sessions without a user claim
default_user_id = 1

# Logo shown in the header
logo = "/logo.svg"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.graphql.endpoint, defaults.graphql.endpoint);
        assert_eq!(config.graphql.admin_secret, None);
        assert_eq!(config.api.port, defaults.api.port);
        assert_eq!(config.api.cors_origins, defaults.api.cors_origins);
        assert_eq!(config.api.session_idle_ttl(), Duration::from_secs(1800));
        assert_eq!(config.api.session_sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.ui.media_display, MediaDisplay::Embed);
        assert_eq!(config.ui.default_user_id, 1);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[graphql]\nadmin_secret = \"s3cret\"\n\n[ui]\nmedia_display = \"link\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.graphql.admin_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.graphql.endpoint, default_endpoint());
        assert_eq!(config.ui.media_display, MediaDisplay::Link);
        assert_eq!(config.api.port, 3000);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nport = \"not a number\"").unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            Config::load(Path::new("/nonexistent/myui.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("MYUI_GRAPHQL_ENDPOINT", "https://hasura.example/v1/graphql"),
            ("MYUI_API_PORT", "9000"),
            ("MYUI_MEDIA_DISPLAY", "link"),
            ("MYUI_DEFAULT_USER_ID", "not-a-number"),
            ("MYUI_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.graphql.endpoint, "https://hasura.example/v1/graphql");
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.ui.media_display, MediaDisplay::Link);
        assert_eq!(config.ui.default_user_id, 1);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_empty_secret_is_not_sent() {
        let mut config = GraphqlConfig::default();
        config.admin_secret = Some(String::new());
        assert_eq!(config.to_hasura().admin_secret, None);

        let options = UiConfig::default().to_shell_options();
        assert_eq!(options.fallback_user_id, 1);
    }
}
