//! In-memory backend

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};
use sylo_core::persistence::{PersistenceBackend, HealthCheckError};

use crate::document::{new_id, Document, DocumentStore, ListFilter};
use crate::errors::Result;

/// Documents per collection, keyed by id (ids sort in creation order)
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn insert(&self, collection: &str, body: Map<String, Value>) -> Result<Document> {
        let doc = Document::new(new_id(), body);
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Ok(self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn list(&self, collection: &str, filter: &ListFilter) -> Result<Vec<Document>> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        let docs = collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(filter.apply(docs))
    }

    async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<Option<Document>> {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let Some(doc) = collections.get_mut(collection).and_then(|docs| docs.get_mut(id)) else {
            return Ok(None);
        };
        doc.apply_patch(patch);
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        Ok(self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn check_connection(&self) -> std::result::Result<(), HealthCheckError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
