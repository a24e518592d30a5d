//! Tenant search service implementation.
//!
//! This module provides the façade the HTTP layer calls into. A
//! `TenantSearchService` is built once around a backend client; each request
//! then addresses a logical index through `TenantSearchService::index`.
//!
//! # Note on Index Creation
//!
//! There is no explicit create operation. Writes (object insert/upsert,
//! batches with writes, settings) provision the index on first use; reads
//! never do and fail with `IndexNotFound` on an index that was never written.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tenant_search_shared::{
    BatchRequest, BatchResult, IndexedObject, QueryResult, SearchRequest, SettingsSpec,
    OBJECT_ID_FIELD,
};
use tracing::{debug, info, instrument};

use crate::batch;
use crate::config::TenantSearchConfig;
use crate::errors::{classify, BackendError, SearchFacadeError};
use crate::interfaces::BackendClient;
use crate::lifecycle::IndexLifecycle;
use crate::naming::resolve;
use crate::query::{parse_facets, parse_hits, QueryCompiler};
use crate::settings::{settings_from_mapping, SettingsTranslator};
use crate::types::{IndexStats, SearchOptions};

/// The main entry point of the engine.
///
/// Holds the injected backend client and the configuration shared by every
/// logical index. Cheap to clone.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tenant_search_repository::{OpenSearchClient, TenantSearchService};
/// use tenant_search_shared::SearchRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OpenSearchClient::new("http://localhost:9200").await?;
/// let service = TenantSearchService::new(Arc::new(client));
///
/// let products = service.index("a1b2", "products");
/// products
///     .create_or_upsert_object(Some("42"), serde_json::json!({"name": "running shoe"}))
///     .await?;
/// let result = products.query(&SearchRequest::text("running")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TenantSearchService {
    client: Arc<dyn BackendClient>,
    config: TenantSearchConfig,
}

impl TenantSearchService {
    /// Create a new TenantSearchService with default configuration.
    pub fn new(client: Arc<dyn BackendClient>) -> Self {
        Self::with_config(client, TenantSearchConfig::default())
    }

    /// Create a new TenantSearchService with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `client` - The backend client (e.g., `OpenSearchClient`)
    /// * `config` - Query defaults and facet settings
    pub fn with_config(client: Arc<dyn BackendClient>, config: TenantSearchConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &TenantSearchConfig {
        &self.config
    }

    /// Handle on the logical index `name` of `tenant_id`.
    ///
    /// Does not touch the backend.
    pub fn index(&self, tenant_id: &str, name: &str) -> TenantIndex {
        let lifecycle = IndexLifecycle::new(self.client.clone());
        TenantIndex {
            tenant_id: tenant_id.to_string(),
            physical_index_id: resolve(tenant_id, name),
            client: self.client.clone(),
            settings: SettingsTranslator::new(
                self.client.clone(),
                lifecycle.clone(),
                self.config.keyword_subfield.clone(),
            ),
            compiler: QueryCompiler::new(
                self.config.default_hits_per_page,
                self.config.keyword_subfield.clone(),
                self.config.facet_size,
            ),
            lifecycle,
        }
    }
}

/// Operations on one logical index.
#[derive(Clone)]
pub struct TenantIndex {
    tenant_id: String,
    physical_index_id: String,
    client: Arc<dyn BackendClient>,
    lifecycle: IndexLifecycle,
    settings: SettingsTranslator,
    compiler: QueryCompiler,
}

impl TenantIndex {
    /// Alias under which the index is addressed on the backend.
    pub fn physical_index_id(&self) -> &str {
        &self.physical_index_id
    }

    fn classify_error<'a>(
        &'a self,
        object_id: Option<&'a str>,
    ) -> impl FnOnce(BackendError) -> SearchFacadeError + 'a {
        move |e| classify(e, &self.physical_index_id, object_id)
    }

    /// Insert an object, or replace the object with the given id.
    ///
    /// Without `object_id` the backend generates a fresh id. Any `objectID`
    /// attribute in `body` is dropped; identity comes from the argument only.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexedObject)` - The stored body and its backend id
    /// * `Err(SearchFacadeError::ValidationError)` - If `body` is not an object
    ///   or `object_id` is empty
    #[instrument(skip(self, body), fields(index = %self.physical_index_id))]
    pub async fn create_or_upsert_object(
        &self,
        object_id: Option<&str>,
        body: Value,
    ) -> Result<IndexedObject, SearchFacadeError> {
        if object_id.is_some_and(str::is_empty) {
            return Err(SearchFacadeError::validation("objectID must not be empty"));
        }
        let body = IndexedObject::body_from_value(body)?;

        self.lifecycle.ensure_exists(&self.physical_index_id).await?;
        let written = self
            .client
            .document_index(&self.physical_index_id, object_id, &Value::Object(body.clone()))
            .await
            .map_err(self.classify_error(object_id))?;

        debug!(object_id = %written.id, version = written.version, "Wrote object");
        Ok(IndexedObject::new(written.id, body))
    }

    /// Read one object.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The stored body with `objectID`
    /// * `Err(SearchFacadeError::ObjectNotFound)` - If the id is absent
    /// * `Err(SearchFacadeError::IndexNotFound)` - If the index does not exist
    pub async fn get_object(&self, object_id: &str) -> Result<Value, SearchFacadeError> {
        let document = self
            .client
            .document_get(&self.physical_index_id, object_id)
            .await
            .map_err(self.classify_error(Some(object_id)))?;

        let mut source = document.source;
        source.remove(OBJECT_ID_FIELD);
        Ok(IndexedObject::new(document.id, source).into_value())
    }

    /// Read several objects in one round-trip.
    ///
    /// Results follow the order of `object_ids`, with `None` for ids that are
    /// absent.
    pub async fn get_many_objects(
        &self,
        object_ids: &[String],
    ) -> Result<Vec<Option<Value>>, SearchFacadeError> {
        if object_ids.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "query": {"ids": {"values": object_ids}},
            "size": object_ids.len(),
        });
        let response = self
            .client
            .search(&self.physical_index_id, &body, SearchOptions::strict())
            .await
            .map_err(self.classify_error(None))?;
        let (hits, _) = parse_hits(&response)?;

        let by_id: HashMap<String, Value> = hits
            .into_iter()
            .filter_map(|hit| {
                let id = hit.get(OBJECT_ID_FIELD)?.as_str()?.to_string();
                Some((id, hit))
            })
            .collect();
        Ok(object_ids.iter().map(|id| by_id.get(id).cloned()).collect())
    }

    /// Delete one object.
    #[instrument(skip(self), fields(index = %self.physical_index_id))]
    pub async fn delete_object(&self, object_id: &str) -> Result<(), SearchFacadeError> {
        self.client
            .document_delete(&self.physical_index_id, object_id)
            .await
            .map_err(self.classify_error(Some(object_id)))?;
        debug!(object_id = %object_id, "Deleted object");
        Ok(())
    }

    /// Run a structured search.
    ///
    /// The index settings are read first: they restrict the text match to the
    /// searchable fields and declare the facets to compute.
    #[instrument(skip(self, request), fields(index = %self.physical_index_id))]
    pub async fn query(&self, request: &SearchRequest) -> Result<QueryResult, SearchFacadeError> {
        let mapping = self.settings.read_mapping(&self.physical_index_id).await?;
        let settings = settings_from_mapping(&mapping);
        let compiled = self.compiler.compile(request, Some(&settings), Some(&mapping))?;

        let response = self
            .client
            .search(&self.physical_index_id, &compiled.body, SearchOptions::strict())
            .await
            .map_err(self.classify_error(None))?;

        let (hits, nb_hits) = parse_hits(&response)?;
        let facets = parse_facets(&response, settings.facet_specs())?;
        debug!(nb_hits, returned = hits.len(), "Query completed");

        Ok(QueryResult {
            hits,
            nb_hits,
            page: compiled.page,
            hits_per_page: compiled.hits_per_page,
            facets,
        })
    }

    /// Apply a batch of creates, upserts and deletes in one bulk call.
    ///
    /// Batches with writes provision the index; delete-only batches require
    /// it to exist. A batch where any item is rejected fails with
    /// `BulkItemFailures`; the accepted items are already applied.
    #[instrument(skip(self, requests), fields(index = %self.physical_index_id, size = requests.len()))]
    pub async fn batch(&self, requests: &[BatchRequest]) -> Result<BatchResult, SearchFacadeError> {
        let payload = batch::compile(requests);
        if payload.is_empty() {
            return Ok(BatchResult::default());
        }

        if payload.has_writes() {
            self.lifecycle.ensure_exists(&self.physical_index_id).await?;
        } else {
            self.lifecycle.require_exists(&self.physical_index_id).await?;
        }

        let response = self
            .client
            .bulk(&self.physical_index_id, &payload.lines)
            .await
            .map_err(self.classify_error(None))?;
        let result = batch::correlate(&response, &payload)?;

        info!(
            inserted = result.inserted.len(),
            upserted = result.upserted.len(),
            deleted = result.deleted.len(),
            "Applied batch"
        );
        Ok(result)
    }

    /// Declare searchable fields and facets. Returns `spec` unchanged.
    pub async fn save_settings(&self, spec: &SettingsSpec) -> Result<SettingsSpec, SearchFacadeError> {
        self.settings.save_settings(&self.physical_index_id, spec).await
    }

    /// Settings currently in effect.
    pub async fn get_settings(&self) -> Result<SettingsSpec, SearchFacadeError> {
        self.settings.get_settings(&self.physical_index_id).await
    }

    /// Make `destination` (a logical name of the same tenant) serve this
    /// index's storage, replacing whatever it served before.
    pub async fn move_to(&self, destination: &str) -> Result<(), SearchFacadeError> {
        let destination = resolve(&self.tenant_id, destination);
        self.lifecycle
            .move_index(&self.physical_index_id, &destination)
            .await?;
        Ok(())
    }

    /// Delete the index and its storage.
    pub async fn drop_index(&self) -> Result<(), SearchFacadeError> {
        self.lifecycle.drop_index(&self.physical_index_id).await
    }

    /// Document count and backing generations.
    pub async fn stats(&self) -> Result<IndexStats, SearchFacadeError> {
        let generations = self.lifecycle.require_exists(&self.physical_index_id).await?;
        let response = self
            .client
            .stats(&self.physical_index_id)
            .await
            .map_err(self.classify_error(None))?;

        let document_count = response
            .pointer("/_all/primaries/docs/count")
            .and_then(Value::as_u64)
            .unwrap_or(0);

        Ok(IndexStats {
            physical_index_id: self.physical_index_id.clone(),
            generations,
            document_count,
        })
    }
}
