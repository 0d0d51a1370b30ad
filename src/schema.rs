//! Schema Introspection
//!
//! Discovers the base tables the backend exposes. For every table the
//! backend also generates `<table>_aggregate` and `<table>_by_pk` root
//! fields; those are lookup variants, not tables, and are filtered out.

use serde::Deserialize;
use std::sync::Arc;

use crate::graphql::{decode, GraphqlTransport, SyncResult};

/// Introspection document listing the root query fields
pub const INTROSPECTION_QUERY: &str =
    "query LearnAboutSchema { __schema { queryType { fields { name } } } }";

const GENERATED_SUFFIXES: [&str; 2] = ["_aggregate", "_by_pk"];

/// Whether a root field name denotes a base table
pub fn is_base_table(name: &str) -> bool {
    !GENERATED_SUFFIXES
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

/// Keep only base table names, preserving order
pub fn filter_base_tables<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(Into::into)
        .filter(|name| is_base_table(name))
        .collect()
}

/// Lists base tables through schema introspection
pub struct SchemaIntrospector {
    transport: Arc<dyn GraphqlTransport>,
}

impl SchemaIntrospector {
    pub fn new(transport: Arc<dyn GraphqlTransport>) -> Self {
        Self { transport }
    }

    /// Root query fields that are base tables, in schema order
    ///
    /// The whole field list is expected in one response.
    pub async fn list_base_tables(&self) -> SyncResult<Vec<String>> {
        let data = self.transport.execute(INTROSPECTION_QUERY).await?;
        let response: IntrospectionResponse = decode(data)?;

        let tables = filter_base_tables(
            response
                .schema
                .query_type
                .fields
                .into_iter()
                .map(|f| f.name),
        );

        tracing::debug!(count = tables.len(), "Introspected base tables");
        Ok(tables)
    }
}

#[derive(Debug, Deserialize)]
struct IntrospectionResponse {
    #[serde(rename = "__schema")]
    schema: SchemaType,
}

#[derive(Debug, Deserialize)]
struct SchemaType {
    #[serde(rename = "queryType")]
    query_type: QueryType,
}

#[derive(Debug, Deserialize)]
struct QueryType {
    #[serde(default)]
    fields: Vec<Field>,
}

#[derive(Debug, Deserialize)]
struct Field {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::{MemoryBackend, SyncError};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    #[test]
    fn test_filter_base_tables() {
        let tables = filter_base_tables(["Product", "Product_aggregate", "Product_by_pk", "Order"]);
        assert_eq!(tables, vec!["Product", "Order"]);
    }

    #[test]
    fn test_suffix_must_be_at_end() {
        assert!(is_base_table("by_pk_history"));
        assert!(is_base_table("aggregate_totals"));
        assert!(!is_base_table("sales_aggregate"));
    }

    #[tokio::test]
    async fn test_list_base_tables() {
        let backend = Arc::new(MemoryBackend::with_root_fields([
            "Product",
            "Product_aggregate",
            "Product_by_pk",
            "Order",
        ]));
        let introspector = SchemaIntrospector::new(backend);

        let tables = introspector.list_base_tables().await.unwrap();
        assert_eq!(tables, vec!["Product", "Order"]);
    }

    struct Canned(Value);

    #[async_trait]
    impl GraphqlTransport for Canned {
        async fn execute(&self, _query: &str) -> SyncResult<Value> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_parse_error() {
        let introspector = SchemaIntrospector::new(Arc::new(Canned(json!({ "tables": [] }))));
        let err = introspector.list_base_tables().await.unwrap_err();
        assert!(matches!(err, SyncError::Parse(_)));
    }
}
