//! Index lifecycle management.
//!
//! A logical index exists when an alias named after its physical index id
//! exists on the backend. Storage is provisioned lazily on the first write by
//! creating a timestamped generation and aliasing it; moves swap aliases in a
//! single atomic alias update.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::errors::{classify, SearchFacadeError};
use crate::interfaces::BackendClient;
use crate::naming::generation_name;
use crate::types::AliasAction;

/// Owns every alias/generation creation decision for logical indices.
#[derive(Clone)]
pub struct IndexLifecycle {
    client: Arc<dyn BackendClient>,
}

impl IndexLifecycle {
    pub fn new(client: Arc<dyn BackendClient>) -> Self {
        Self { client }
    }

    /// Concrete generations currently aliased as `alias`, or `None` when the
    /// alias does not exist.
    async fn lookup(&self, alias: &str) -> Result<Option<Vec<String>>, SearchFacadeError> {
        match self.client.alias_get(alias).await {
            Ok(response) => {
                let generations = aliased_indices(&response);
                Ok((!generations.is_empty()).then_some(generations))
            }
            Err(e) => match classify(e, alias, None) {
                SearchFacadeError::IndexNotFound { .. } => Ok(None),
                other => Err(other),
            },
        }
    }

    /// Generations aliased as `physical_index_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - At least one generation name
    /// * `Err(SearchFacadeError::IndexNotFound)` - If the alias does not exist
    pub async fn require_exists(
        &self,
        physical_index_id: &str,
    ) -> Result<Vec<String>, SearchFacadeError> {
        self.lookup(physical_index_id)
            .await?
            .ok_or_else(|| SearchFacadeError::index_not_found(physical_index_id))
    }

    /// Make sure the logical index has backing storage, creating and aliasing
    /// a new generation if the alias is absent.
    ///
    /// Safe to call before every mutating operation. Reads must not call it.
    ///
    /// This is a check-then-act sequence without mutual exclusion: concurrent
    /// first writers to the same brand-new index can each create a generation
    /// and alias it. Callers needing single creation must serialize per index
    /// above this layer.
    #[instrument(skip(self))]
    pub async fn ensure_exists(&self, physical_index_id: &str) -> Result<(), SearchFacadeError> {
        if let Some(generations) = self.lookup(physical_index_id).await? {
            debug!(alias = %physical_index_id, generations = ?generations, "Index already provisioned");
            return Ok(());
        }

        let generation = generation_name(physical_index_id, Utc::now());
        self.client
            .index_create(&generation)
            .await
            .map_err(SearchFacadeError::Unclassified)?;
        self.client
            .alias_put(&generation, physical_index_id)
            .await
            .map_err(SearchFacadeError::Unclassified)?;

        info!(alias = %physical_index_id, generation = %generation, "Provisioned index generation");
        Ok(())
    }

    /// Point `destination` at the generation currently behind `source`.
    ///
    /// Any generation already aliased as `destination` is removed from that
    /// alias in the same atomic alias update, so `destination` is never
    /// undefined. The source alias is left in place.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<AliasAction>)` - The actions that were applied
    /// * `Err(SearchFacadeError::IndexNotFound)` - If `source` does not exist
    #[instrument(skip(self))]
    pub async fn move_index(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<Vec<AliasAction>, SearchFacadeError> {
        let source_generations = self.require_exists(source).await?;
        let destination_generations = self.lookup(destination).await?.unwrap_or_default();

        let mut actions: Vec<AliasAction> = destination_generations
            .iter()
            .filter(|g| !source_generations.contains(g))
            .map(|g| AliasAction::remove(g.as_str(), destination))
            .collect();
        actions.extend(
            source_generations
                .iter()
                .map(|g| AliasAction::add(g.as_str(), destination)),
        );

        self.client
            .aliases_update(&actions)
            .await
            .map_err(SearchFacadeError::Unclassified)?;

        info!(
            source = %source,
            destination = %destination,
            replaced = ?destination_generations,
            "Moved index alias"
        );
        Ok(actions)
    }

    /// Delete the storage behind `physical_index_id`.
    ///
    /// The alias is resolved to its generations first since the backend does
    /// not delete indices addressed through an alias; deleting a generation
    /// also drops its aliases.
    #[instrument(skip(self))]
    pub async fn drop_index(&self, physical_index_id: &str) -> Result<(), SearchFacadeError> {
        let generations = self.require_exists(physical_index_id).await?;
        if generations.len() > 1 {
            warn!(alias = %physical_index_id, generations = ?generations, "Alias backed by several generations");
        }

        for generation in &generations {
            self.client
                .index_delete(generation)
                .await
                .map_err(|e| classify(e, physical_index_id, None))?;
        }

        info!(alias = %physical_index_id, generations = ?generations, "Dropped index");
        Ok(())
    }
}

/// Concrete index names in an alias lookup response
/// (`{"<index>": {"aliases": {..}}, ..}`), sorted.
pub fn aliased_indices(response: &Value) -> Vec<String> {
    let mut names: Vec<String> = response
        .as_object()
        .map(|indices| indices.keys().cloned().collect())
        .unwrap_or_default();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BackendError;
    use crate::types::{DocumentWriteResult, SearchOptions, StoredDocument};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock backend with a fixed alias table that records mutating calls.
    #[derive(Default)]
    struct MockBackend {
        aliases: HashMap<String, Vec<String>>,
        created: Mutex<Vec<String>>,
        alias_puts: Mutex<Vec<(String, String)>>,
        alias_updates: Mutex<Vec<Vec<AliasAction>>>,
        deleted: Mutex<Vec<String>>,
        alias_get_error: Option<BackendError>,
    }

    impl MockBackend {
        fn with_alias(mut self, alias: &str, generations: &[&str]) -> Self {
            self.aliases.insert(
                alias.to_string(),
                generations.iter().map(|g| g.to_string()).collect(),
            );
            self
        }
    }

    #[async_trait]
    impl BackendClient for MockBackend {
        async fn index_create(&self, name: &str) -> Result<(), BackendError> {
            self.created.lock().unwrap().push(name.to_string());
            Ok(())
        }

        async fn index_delete(&self, name: &str) -> Result<(), BackendError> {
            self.deleted.lock().unwrap().push(name.to_string());
            Ok(())
        }

        async fn alias_get(&self, name: &str) -> Result<Value, BackendError> {
            if let Some(error) = &self.alias_get_error {
                return Err(error.clone());
            }
            match self.aliases.get(name) {
                Some(generations) => {
                    let mut response = serde_json::Map::new();
                    for g in generations {
                        response.insert(g.clone(), json!({"aliases": {name: {}}}));
                    }
                    Ok(Value::Object(response))
                }
                None => Err(BackendError::status(
                    404,
                    Some(json!({"error": format!("alias [{}] missing", name), "status": 404})),
                )),
            }
        }

        async fn alias_put(&self, index_name: &str, alias_name: &str) -> Result<(), BackendError> {
            self.alias_puts
                .lock()
                .unwrap()
                .push((index_name.to_string(), alias_name.to_string()));
            Ok(())
        }

        async fn aliases_update(&self, actions: &[AliasAction]) -> Result<(), BackendError> {
            self.alias_updates.lock().unwrap().push(actions.to_vec());
            Ok(())
        }

        async fn document_index(
            &self,
            _index: &str,
            _id: Option<&str>,
            _body: &Value,
        ) -> Result<DocumentWriteResult, BackendError> {
            unimplemented!()
        }

        async fn document_get(&self, _index: &str, _id: &str) -> Result<StoredDocument, BackendError> {
            unimplemented!()
        }

        async fn document_delete(&self, _index: &str, _id: &str) -> Result<(), BackendError> {
            unimplemented!()
        }

        async fn bulk(&self, _index: &str, _operations: &[Value]) -> Result<Value, BackendError> {
            unimplemented!()
        }

        async fn search(
            &self,
            _index: &str,
            _body: &Value,
            _options: SearchOptions,
        ) -> Result<Value, BackendError> {
            unimplemented!()
        }

        async fn mapping_get(&self, _index: &str) -> Result<Value, BackendError> {
            unimplemented!()
        }

        async fn mapping_put(&self, _index: &str, _body: &Value) -> Result<(), BackendError> {
            unimplemented!()
        }

        async fn stats(&self, _index: &str) -> Result<Value, BackendError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_ensure_exists_creates_and_aliases_generation() {
        let backend = Arc::new(MockBackend::default());
        let lifecycle = IndexLifecycle::new(backend.clone());

        lifecycle.ensure_exists("t1_products").await.unwrap();

        let created = backend.created.lock().unwrap().clone();
        assert_eq!(created.len(), 1);
        assert!(created[0].starts_with("t1_products_"));

        let puts = backend.alias_puts.lock().unwrap().clone();
        assert_eq!(puts, vec![(created[0].clone(), "t1_products".to_string())]);
    }

    #[tokio::test]
    async fn test_ensure_exists_is_noop_when_aliased() {
        let backend = Arc::new(MockBackend::default().with_alias("t1_products", &["g0"]));
        let lifecycle = IndexLifecycle::new(backend.clone());

        lifecycle.ensure_exists("t1_products").await.unwrap();

        assert!(backend.created.lock().unwrap().is_empty());
        assert!(backend.alias_puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_exists_propagates_other_failures() {
        let backend = Arc::new(MockBackend {
            alias_get_error: Some(BackendError::status(500, None)),
            ..Default::default()
        });
        let lifecycle = IndexLifecycle::new(backend.clone());

        let result = lifecycle.ensure_exists("t1_products").await;
        assert!(matches!(result, Err(SearchFacadeError::Unclassified(_))));
        assert!(backend.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_move_replaces_destination_in_one_update() {
        let backend = Arc::new(
            MockBackend::default()
                .with_alias("t1_x", &["t1_x_gen"])
                .with_alias("t1_y", &["g0"]),
        );
        let lifecycle = IndexLifecycle::new(backend.clone());

        lifecycle.move_index("t1_x", "t1_y").await.unwrap();

        let updates = backend.alias_updates.lock().unwrap().clone();
        assert_eq!(updates.len(), 1);
        assert_eq!(
            updates[0],
            vec![
                AliasAction::remove("g0", "t1_y"),
                AliasAction::add("t1_x_gen", "t1_y"),
            ]
        );
    }

    #[tokio::test]
    async fn test_move_to_new_destination_only_adds() {
        let backend = Arc::new(MockBackend::default().with_alias("t1_x", &["t1_x_gen"]));
        let lifecycle = IndexLifecycle::new(backend.clone());

        let actions = lifecycle.move_index("t1_x", "t1_y").await.unwrap();

        assert_eq!(actions, vec![AliasAction::add("t1_x_gen", "t1_y")]);
    }

    #[tokio::test]
    async fn test_move_with_missing_source_fails() {
        let backend = Arc::new(MockBackend::default());
        let lifecycle = IndexLifecycle::new(backend.clone());

        let result = lifecycle.move_index("t1_x", "t1_y").await;
        assert!(matches!(result, Err(SearchFacadeError::IndexNotFound { .. })));
        assert!(backend.alias_updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drop_deletes_generation() {
        let backend = Arc::new(MockBackend::default().with_alias("t1_x", &["t1_x_gen"]));
        let lifecycle = IndexLifecycle::new(backend.clone());

        lifecycle.drop_index("t1_x").await.unwrap();

        assert_eq!(backend.deleted.lock().unwrap().clone(), vec!["t1_x_gen"]);
    }

    #[tokio::test]
    async fn test_drop_missing_index() {
        let lifecycle = IndexLifecycle::new(Arc::new(MockBackend::default()));
        let result = lifecycle.drop_index("t1_x").await;
        assert!(matches!(result, Err(SearchFacadeError::IndexNotFound { .. })));
    }

    #[test]
    fn test_aliased_indices() {
        let response = json!({"b": {"aliases": {"x": {}}}, "a": {"aliases": {"x": {}}}});
        assert_eq!(aliased_indices(&response), vec!["a", "b"]);
        assert!(aliased_indices(&json!({})).is_empty());
    }
}
