//! Configuration Sync Client
//!
//! Reads the latest stored version of a user's configuration and appends new
//! versions. Versions are never updated or deleted; the newest by `date`
//! is the current one.

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::auth::UserId;
use crate::graphql::{decode, literal, GraphqlTransport, SyncError, SyncResult};
use crate::userconfig::UserConfiguration;

/// Build the document reading the newest configuration version of a user
pub fn latest_config_query(user_id: UserId) -> String {
    format!(
        "query getConfigurationFromUser {{ user_versioned_config(where: {{user_id: {{_eq: {}}}}}, order_by: {{date: desc}}, limit: 1) {{ config }} }}",
        user_id
    )
}

/// Build the document appending a configuration version for a user
///
/// `document` is the serialized configuration; it is embedded as an escaped
/// GraphQL string literal.
pub fn insert_config_mutation(user_id: UserId, document: &str) -> String {
    format!(
        "mutation insertUserConfiguration {{ insert_user_versioned_config_one(object: {{user_id: {}, config: {}}}) {{ id }} }}",
        user_id,
        literal::quote(document)
    )
}

/// Client for the versioned user configuration table
pub struct ConfigSyncClient {
    transport: Arc<dyn GraphqlTransport>,
}

impl ConfigSyncClient {
    /// Create a new client over the given transport
    pub fn new(transport: Arc<dyn GraphqlTransport>) -> Self {
        Self { transport }
    }

    /// Fetch the newest configuration version of a user
    ///
    /// Users with no stored version get the default configuration.
    pub async fn fetch_latest(&self, user_id: UserId) -> SyncResult<UserConfiguration> {
        let data = self
            .transport
            .execute(&latest_config_query(user_id))
            .await?;
        let response: LatestConfigResponse = decode(data)?;

        match response.user_versioned_config.into_iter().next() {
            Some(row) => {
                let config = decode_stored_config(row.config)?;
                tracing::debug!(user_id, "Loaded stored configuration");
                Ok(config)
            }
            None => {
                tracing::info!(user_id, "No stored configuration, using default");
                Ok(UserConfiguration::default())
            }
        }
    }

    /// Append `config` as the newest version for a user
    pub async fn persist(&self, user_id: UserId, config: &UserConfiguration) -> SyncResult<()> {
        let document = serde_json::to_string(config)?;
        self.transport
            .execute(&insert_config_mutation(user_id, &document))
            .await?;

        tracing::info!(
            user_id,
            dashboards = config.dashboards.len(),
            "Persisted configuration version"
        );
        Ok(())
    }
}

/// Decode the stored `config` column
///
/// The column normally holds the configuration as JSON text. Rows whose
/// quotes were escaped once more are unescaped a single time and retried.
/// A JSON object (jsonb column) is accepted directly.
pub fn decode_stored_config(value: Value) -> SyncResult<UserConfiguration> {
    match value {
        Value::String(text) => match serde_json::from_str(&text) {
            Ok(config) => Ok(config),
            Err(first) => {
                let unescaped = literal::unescape_quotes_once(&text);
                if unescaped == text.as_str() {
                    return Err(SyncError::Parse(format!(
                        "stored configuration is not valid JSON: {}",
                        first
                    )));
                }
                serde_json::from_str(&unescaped).map_err(|e| {
                    SyncError::Parse(format!("stored configuration is not valid JSON: {}", e))
                })
            }
        },
        Value::Object(_) => decode(value),
        other => Err(SyncError::Parse(format!(
            "stored configuration has unexpected type: {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Deserialize)]
struct LatestConfigResponse {
    user_versioned_config: Vec<StoredConfigRow>,
}

#[derive(Debug, Deserialize)]
struct StoredConfigRow {
    config: Value,
}
