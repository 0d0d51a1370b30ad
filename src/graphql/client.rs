//! GraphQL HTTP Client
//!
//! Sends query documents to a Hasura-style GraphQL endpoint:
//! `POST <endpoint>` with body `{"query": ...}`, a JSON content type and the
//! admin-secret header.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{SyncError, SyncResult};

/// Header carrying the admin secret
pub const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

/// Something that can execute a GraphQL document and return its `data`
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    /// Execute `query` and return the `data` member of the response
    async fn execute(&self, query: &str) -> SyncResult<Value>;
}

/// Decode the `data` member of a response into a typed value
pub fn decode<T: DeserializeOwned>(data: Value) -> SyncResult<T> {
    serde_json::from_value(data).map_err(SyncError::from)
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HasuraConfig {
    /// GraphQL endpoint URL (e.g., "http://localhost:8080/v1/graphql")
    pub endpoint: String,
    /// Admin secret; the header is omitted when unset
    pub admin_secret: Option<String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for HasuraConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/v1/graphql".to_string(),
            admin_secret: None,
            request_timeout_ms: 10_000,
        }
    }
}

/// HTTP transport for a Hasura GraphQL endpoint
pub struct HasuraClient {
    client: Client,
    config: HasuraConfig,
}

impl HasuraClient {
    /// Create a new client with the given configuration
    pub fn new(config: HasuraConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| SyncError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &HasuraConfig {
        &self.config
    }
}

#[async_trait]
impl GraphqlTransport for HasuraClient {
    async fn execute(&self, query: &str) -> SyncResult<Value> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&GraphqlRequest { query });

        if let Some(secret) = &self.config.admin_secret {
            request = request.header(ADMIN_SECRET_HEADER, secret);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: GraphqlResponse = response.json().await?;
        body.into_data()
    }
}

// ============================================
// Request/Response envelope
// ============================================

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
}

/// Standard GraphQL response envelope
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphqlErrorMessage>,
}

/// One entry of the `errors` array
#[derive(Debug, Deserialize)]
pub struct GraphqlErrorMessage {
    pub message: String,
}

impl GraphqlResponse {
    /// Unwrap the envelope into its `data`, surfacing GraphQL errors
    pub fn into_data(self) -> SyncResult<Value> {
        if !self.errors.is_empty() {
            return Err(SyncError::Graphql(
                self.errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        match self.data {
            Some(Value::Null) | None => {
                Err(SyncError::Parse("response carried no data".to_string()))
            }
            Some(data) => Ok(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = HasuraConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8080/v1/graphql");
        assert!(config.admin_secret.is_none());
    }

    /// Serve an endpoint that answers with the request it received
    async fn echo_endpoint() -> String {
        use axum::{http::HeaderMap, routing::post, Json, Router};

        async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
            let header = |name: &str| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            Json(json!({
                "data": {
                    "contentType": header("content-type"),
                    "secret": header(ADMIN_SECRET_HEADER),
                    "body": body,
                }
            }))
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().route("/v1/graphql", post(echo)))
                .await
                .unwrap();
        });
        format!("http://{}/v1/graphql", addr)
    }

    #[tokio::test]
    async fn test_execute_sends_json_and_secret() {
        let client = HasuraClient::new(HasuraConfig {
            endpoint: echo_endpoint().await,
            admin_secret: Some("s3cret".to_string()),
            ..HasuraConfig::default()
        })
        .unwrap();

        let data = client.execute("{ Product { id } }").await.unwrap();
        assert_eq!(data["contentType"], "application/json");
        assert_eq!(data["secret"], "s3cret");
        assert_eq!(data["body"], json!({ "query": "{ Product { id } }" }));
    }

    #[tokio::test]
    async fn test_execute_omits_unset_secret() {
        let client = HasuraClient::new(HasuraConfig {
            endpoint: echo_endpoint().await,
            ..HasuraConfig::default()
        })
        .unwrap();

        let data = client.execute("{ a }").await.unwrap();
        assert_eq!(data["contentType"], "application/json");
        assert_eq!(data["secret"], Value::Null);
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GraphqlRequest { query: "{ a }" }).unwrap();
        assert_eq!(body, json!({ "query": "{ a }" }));
    }

    #[test]
    fn test_envelope_with_data() {
        let response: GraphqlResponse =
            serde_json::from_value(json!({ "data": { "a": 1 } })).unwrap();
        assert_eq!(response.into_data().unwrap(), json!({ "a": 1 }));
    }

    #[test]
    fn test_envelope_with_errors() {
        let response: GraphqlResponse = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "field 'x' not found", "extensions": {} }]
        }))
        .unwrap();

        match response.into_data() {
            Err(SyncError::Graphql(messages)) => {
                assert_eq!(messages, vec!["field 'x' not found".to_string()])
            }
            other => panic!("expected GraphQL error, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope_without_data() {
        let response: GraphqlResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(response.into_data(), Err(SyncError::Parse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let client = HasuraClient::new(HasuraConfig {
            endpoint: "http://127.0.0.1:1/v1/graphql".to_string(),
            admin_secret: Some("secret".to_string()),
            request_timeout_ms: 2_000,
        })
        .unwrap();

        let err = client.execute("{ a }").await.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {:?}", err);
    }
}
