//! Backend client trait definition.
//!
//! This module defines the typed operations the engine needs from the remote
//! search engine (OpenSearch, Elasticsearch, ...). The client is stateless
//! transport: it performs no retries and no classification of errors.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::BackendError;
use crate::types::{AliasAction, DocumentWriteResult, SearchOptions, StoredDocument};

/// Abstracts the remote search engine.
///
/// Implementations are injected into `TenantSearchService` as
/// `Arc<dyn BackendClient>`, which keeps the engine free of global client
/// state and lets tests substitute mocks.
///
/// All methods return the raw `BackendError` on failure; the engine classifies
/// it according to the addressed index/document.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Create a concrete index.
    async fn index_create(&self, name: &str) -> Result<(), BackendError>;

    /// Delete a concrete index.
    async fn index_delete(&self, name: &str) -> Result<(), BackendError>;

    /// Look up the indices an alias points to.
    ///
    /// Returns the raw `{"<index>": {"aliases": {..}}}` response; a missing
    /// alias is reported as a 404 `BackendError`.
    async fn alias_get(&self, name: &str) -> Result<Value, BackendError>;

    /// Point `alias_name` at `index_name`.
    async fn alias_put(&self, index_name: &str, alias_name: &str) -> Result<(), BackendError>;

    /// Apply several alias actions atomically.
    async fn aliases_update(&self, actions: &[AliasAction]) -> Result<(), BackendError>;

    /// Index a document; the backend generates an id when `id` is `None`.
    async fn document_index(
        &self,
        index: &str,
        id: Option<&str>,
        body: &Value,
    ) -> Result<DocumentWriteResult, BackendError>;

    /// Fetch a document by id.
    async fn document_get(&self, index: &str, id: &str) -> Result<StoredDocument, BackendError>;

    /// Delete a document by id.
    async fn document_delete(&self, index: &str, id: &str) -> Result<(), BackendError>;

    /// Submit a bulk payload (header/body lines) and return the raw response.
    async fn bulk(&self, index: &str, operations: &[Value]) -> Result<Value, BackendError>;

    /// Execute a search and return the raw response.
    async fn search(
        &self,
        index: &str,
        body: &Value,
        options: SearchOptions,
    ) -> Result<Value, BackendError>;

    /// Read the field mapping of an index.
    async fn mapping_get(&self, index: &str) -> Result<Value, BackendError>;

    /// Update the field mapping of an index.
    async fn mapping_put(&self, index: &str, body: &Value) -> Result<(), BackendError>;

    /// Read index statistics.
    async fn stats(&self, index: &str) -> Result<Value, BackendError>;
}
