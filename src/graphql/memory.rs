//! In-process GraphQL backend
//!
//! Answers the three documents the shell issues (latest-config read,
//! config insert, schema introspection) from memory, with the same
//! append-only, latest-by-date semantics as the real versioned table.
//! Used by the CLI's `--memory` mode and by tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::client::GraphqlTransport;
use super::error::{SyncError, SyncResult};
use super::literal;

/// One stored configuration version
#[derive(Debug, Clone, PartialEq)]
pub struct StoredConfig {
    pub id: u64,
    pub user_id: i64,
    /// Configuration document exactly as stored
    pub config: String,
    pub date: DateTime<Utc>,
}

struct MemoryState {
    rows: Vec<StoredConfig>,
    root_fields: Vec<String>,
    next_id: u64,
}

/// In-memory stand-in for the GraphQL endpoint
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
    offline: AtomicBool,
    requests: AtomicUsize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create a backend exposing only the configuration table
    pub fn new() -> Self {
        Self::with_root_fields([
            "user_versioned_config",
            "user_versioned_config_aggregate",
            "user_versioned_config_by_pk",
        ])
    }

    /// Create a backend whose schema exposes the given root query fields
    pub fn with_root_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: RwLock::new(MemoryState {
                rows: Vec::new(),
                root_fields: fields.into_iter().map(Into::into).collect(),
                next_id: 1,
            }),
            offline: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        }
    }

    /// Simulate an unreachable endpoint
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of documents executed so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Store a raw configuration document for a user, returning its row id
    pub async fn insert_raw(&self, user_id: i64, config: impl Into<String>) -> u64 {
        let mut state = self.state.write().await;

        let now = Utc::now();
        let date = match state.rows.iter().map(|r| r.date).max() {
            Some(last) if last >= now => last + Duration::milliseconds(1),
            _ => now,
        };

        let id = state.next_id;
        state.next_id += 1;
        state.rows.push(StoredConfig {
            id,
            user_id,
            config: config.into(),
            date,
        });

        id
    }

    /// All stored versions for a user, oldest first
    pub async fn rows(&self, user_id: i64) -> Vec<StoredConfig> {
        let state = self.state.read().await;
        state
            .rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    async fn latest(&self, user_id: i64) -> Option<StoredConfig> {
        let state = self.state.read().await;
        state
            .rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| (r.date, r.id))
            .cloned()
    }

    async fn introspect(&self) -> Value {
        let state = self.state.read().await;
        let fields: Vec<Value> = state
            .root_fields
            .iter()
            .map(|name| json!({ "name": name }))
            .collect();

        json!({ "__schema": { "queryType": { "fields": fields } } })
    }
}

#[async_trait]
impl GraphqlTransport for MemoryBackend {
    async fn execute(&self, query: &str) -> SyncResult<Value> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Unavailable);
        }

        if query.contains("insert_user_versioned_config_one") {
            let user_id = int_after(query, "user_id:")
                .ok_or_else(|| unsupported("insert without user_id"))?;
            let config = query
                .find("config:")
                .and_then(|at| literal::read_string(&query[at + "config:".len()..]))
                .map(|(value, _)| value)
                .ok_or_else(|| unsupported("insert without config string"))?;

            let id = self.insert_raw(user_id, config).await;
            tracing::debug!(user_id, id, "Memory backend stored configuration");
            return Ok(json!({ "insert_user_versioned_config_one": { "id": id } }));
        }

        if query.contains("user_versioned_config(") {
            let user_id =
                int_after(query, "_eq:").ok_or_else(|| unsupported("read without user_id"))?;
            let rows: Vec<Value> = self
                .latest(user_id)
                .await
                .map(|row| json!({ "config": row.config }))
                .into_iter()
                .collect();
            return Ok(json!({ "user_versioned_config": rows }));
        }

        if query.contains("__schema") {
            return Ok(self.introspect().await);
        }

        Err(unsupported("unsupported document"))
    }
}

fn unsupported(message: &str) -> SyncError {
    SyncError::Graphql(vec![message.to_string()])
}

/// Parse the integer following the first occurrence of `marker`
fn int_after(src: &str, marker: &str) -> Option<i64> {
    let rest = src[src.find(marker)? + marker.len()..].trim_start();
    let end = rest
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_after() {
        assert_eq!(int_after("where: {user_id: {_eq: 42}}", "_eq:"), Some(42));
        assert_eq!(int_after("user_id: -3, config", "user_id:"), Some(-3));
        assert_eq!(int_after("user_id: x", "user_id:"), None);
        assert_eq!(int_after("nothing here", "_eq:"), None);
    }

    #[tokio::test]
    async fn test_introspection_lists_root_fields() {
        let backend = MemoryBackend::with_root_fields(["Product", "Order"]);
        let data = backend
            .execute("query { __schema { queryType { fields { name } } } }")
            .await
            .unwrap();
        assert_eq!(data["__schema"]["queryType"]["fields"][1]["name"], "Order");
    }

    #[tokio::test]
    async fn test_latest_row_wins() {
        let backend = MemoryBackend::new();
        backend.insert_raw(1, "first").await;
        backend.insert_raw(2, "other user").await;
        backend.insert_raw(1, "second").await;

        let data = backend
            .execute("query { user_versioned_config(where: {user_id: {_eq: 1}}, order_by: {date: desc}, limit: 1) { config } }")
            .await
            .unwrap();
        assert_eq!(data["user_versioned_config"][0]["config"], "second");

        let rows = backend.rows(1).await;
        assert_eq!(rows.len(), 2);
        assert!(rows[0].date < rows[1].date);
    }

    #[tokio::test]
    async fn test_offline_fails_every_request() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);

        let err = backend.execute("query { __schema { x } }").await.unwrap_err();
        assert!(matches!(err, SyncError::Unavailable));
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_document() {
        let backend = MemoryBackend::new();
        let err = backend.execute("query { something_else { id } }").await.unwrap_err();
        assert!(matches!(err, SyncError::Graphql(_)));
    }
}
