//! OpenSearch backend client implementation.
//!
//! This module provides the concrete implementation of `BackendClient`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::{
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{
        IndicesCreateParts, IndicesDeleteParts, IndicesGetAliasParts, IndicesGetMappingParts,
        IndicesPutAliasParts, IndicesPutMappingParts, IndicesStatsParts,
    },
    params::ExpandWildcards,
    BulkParts, DeleteParts, GetParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::{BackendError, SearchFacadeError};
use crate::interfaces::BackendClient;
use crate::types::{AliasAction, DocumentWriteResult, SearchOptions, StoredDocument};

/// OpenSearch backend client.
///
/// Stateless transport over a single-node connection pool. One instance is
/// constructed by the composing application and shared as
/// `Arc<dyn BackendClient>`.
///
/// # Example
///
/// ```ignore
/// let client = OpenSearchClient::new("http://localhost:9200").await?;
/// let service = TenantSearchService::new(Arc::new(client));
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchFacadeError::ConnectionError)` - If connection setup fails
    pub async fn new(url: &str) -> Result<Self, SearchFacadeError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchFacadeError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchFacadeError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch client");

        Ok(Self { client })
    }

    /// Check that the cluster answers.
    ///
    /// Client construction does not contact the server; callers that want to
    /// wait for the backend at startup ping it.
    pub async fn ping(&self) -> Result<(), SearchFacadeError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchFacadeError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchFacadeError::connection(format!(
                "ping answered with status {}",
                status
            )));
        }
        Ok(())
    }

    /// Read a response body, turning non-success statuses into `BackendError`.
    async fn read_json(response: Response, operation: &str) -> Result<Value, BackendError> {
        let status = response.status_code();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::transport(e.to_string()))?;
        let body: Option<Value> = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };

        if !status.is_success() {
            // 404s are expected outcomes and are classified upstream
            if status.as_u16() == 404 {
                debug!(operation, status = %status, "Backend reported not found");
            } else {
                error!(operation, status = %status, body = %text, "Backend request failed");
            }
            return Err(BackendError::status(status.as_u16(), body));
        }

        Ok(body.unwrap_or(Value::Null))
    }

    fn transport_error(operation: &str, err: opensearch::Error) -> BackendError {
        error!(operation, error = %err, "Backend request could not be sent");
        BackendError::transport(err.to_string())
    }

    fn string_field(body: &Value, key: &str) -> Result<String, BackendError> {
        body.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BackendError::parse(format!("missing '{}' in response", key)))
    }
}

/// Deleting a missing document answers `result: not_found` rather than
/// `found: false`; report it the way a missing document read is reported.
fn normalize_delete_not_found(mut error: BackendError) -> BackendError {
    if let Some(Value::Object(body)) = error.body.as_mut() {
        let not_found = body.get("result").and_then(Value::as_str) == Some("not_found");
        if not_found && !body.contains_key("found") {
            body.insert("found".to_string(), Value::Bool(false));
        }
    }
    error
}

#[async_trait]
impl BackendClient for OpenSearchClient {
    async fn index_create(&self, name: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(name))
            .body(json!({}))
            .send()
            .await
            .map_err(|e| Self::transport_error("index_create", e))?;
        Self::read_json(response, "index_create").await?;
        Ok(())
    }

    async fn index_delete(&self, name: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[name]))
            .send()
            .await
            .map_err(|e| Self::transport_error("index_delete", e))?;
        Self::read_json(response, "index_delete").await?;
        Ok(())
    }

    async fn alias_get(&self, name: &str) -> Result<Value, BackendError> {
        let response = self
            .client
            .indices()
            .get_alias(IndicesGetAliasParts::Name(&[name]))
            .send()
            .await
            .map_err(|e| Self::transport_error("alias_get", e))?;
        Self::read_json(response, "alias_get").await
    }

    async fn alias_put(&self, index_name: &str, alias_name: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .indices()
            .put_alias(IndicesPutAliasParts::IndexName(&[index_name], alias_name))
            .send()
            .await
            .map_err(|e| Self::transport_error("alias_put", e))?;
        Self::read_json(response, "alias_put").await?;
        Ok(())
    }

    async fn aliases_update(&self, actions: &[AliasAction]) -> Result<(), BackendError> {
        let actions: Vec<Value> = actions.iter().map(AliasAction::to_json).collect();
        let response = self
            .client
            .indices()
            .update_aliases()
            .body(json!({ "actions": actions }))
            .send()
            .await
            .map_err(|e| Self::transport_error("aliases_update", e))?;
        Self::read_json(response, "aliases_update").await?;
        Ok(())
    }

    async fn document_index(
        &self,
        index: &str,
        id: Option<&str>,
        body: &Value,
    ) -> Result<DocumentWriteResult, BackendError> {
        let parts = match id {
            Some(id) => IndexParts::IndexId(index, id),
            None => IndexParts::Index(index),
        };
        let response = self
            .client
            .index(parts)
            .body(body.clone())
            .send()
            .await
            .map_err(|e| Self::transport_error("document_index", e))?;
        let body = Self::read_json(response, "document_index").await?;

        Ok(DocumentWriteResult {
            id: Self::string_field(&body, "_id")?,
            version: body.get("_version").and_then(Value::as_i64).unwrap_or_default(),
        })
    }

    async fn document_get(&self, index: &str, id: &str) -> Result<StoredDocument, BackendError> {
        let response = self
            .client
            .get(GetParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| Self::transport_error("document_get", e))?;
        let body = Self::read_json(response, "document_get").await?;

        let source = match body.get("_source") {
            Some(Value::Object(source)) => source.clone(),
            _ => Map::new(),
        };
        Ok(StoredDocument {
            id: Self::string_field(&body, "_id")?,
            source,
        })
    }

    async fn document_delete(&self, index: &str, id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| Self::transport_error("document_delete", e))?;
        Self::read_json(response, "document_delete")
            .await
            .map_err(normalize_delete_not_found)?;
        Ok(())
    }

    async fn bulk(&self, index: &str, operations: &[Value]) -> Result<Value, BackendError> {
        let body: Vec<JsonBody<Value>> = operations.iter().cloned().map(JsonBody::new).collect();
        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| Self::transport_error("bulk", e))?;
        Self::read_json(response, "bulk").await
    }

    async fn search(
        &self,
        index: &str,
        body: &Value,
        options: SearchOptions,
    ) -> Result<Value, BackendError> {
        let expand_wildcards: &[ExpandWildcards] = if options.expand_wildcards_none {
            &[ExpandWildcards::None]
        } else {
            &[ExpandWildcards::Open]
        };
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .expand_wildcards(expand_wildcards)
            .allow_no_indices(options.allow_no_indices)
            .body(body.clone())
            .send()
            .await
            .map_err(|e| Self::transport_error("search", e))?;
        Self::read_json(response, "search").await
    }

    async fn mapping_get(&self, index: &str) -> Result<Value, BackendError> {
        let response = self
            .client
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| Self::transport_error("mapping_get", e))?;
        Self::read_json(response, "mapping_get").await
    }

    async fn mapping_put(&self, index: &str, body: &Value) -> Result<(), BackendError> {
        let response = self
            .client
            .indices()
            .put_mapping(IndicesPutMappingParts::Index(&[index]))
            .body(body.clone())
            .send()
            .await
            .map_err(|e| Self::transport_error("mapping_put", e))?;
        Self::read_json(response, "mapping_put").await?;
        Ok(())
    }

    async fn stats(&self, index: &str) -> Result<Value, BackendError> {
        let response = self
            .client
            .indices()
            .stats(IndicesStatsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| Self::transport_error("stats", e))?;
        Self::read_json(response, "stats").await
    }
}
