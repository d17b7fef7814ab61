//! In-process [`Store`] backend.
//!
//! Keeps every collection as an ordered map of id to JSON document behind a
//! single `tokio` read/write lock. Used by the test suites and by the
//! server's `memory` backend, where nothing outlives the process.

use std::collections::BTreeMap;

use async_trait::async_trait;
use kmud_types::ObjectId;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::collection::Collection;
use crate::error::DbError;
use crate::store::{Cursor, Filter, Store, Update, stamp_id};

type Documents = BTreeMap<ObjectId, Value>;

/// A [`Store`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<Collection, Documents>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a single document by id, if present.
    pub async fn get(&self, collection: Collection, id: ObjectId) -> Option<Value> {
        self.collections
            .read()
            .await
            .get(&collection)
            .and_then(|docs| docs.get(&id))
            .cloned()
    }

    /// Total number of documents across all collections.
    pub async fn len(&self) -> usize {
        self.collections.read().await.values().map(BTreeMap::len).sum()
    }

    /// Whether the store holds no documents at all.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_id(
        &self,
        collection: Collection,
        id: ObjectId,
        document: Value,
    ) -> Result<(), DbError> {
        let document = Value::Object(stamp_id(collection, id, document)?);
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id, document);
        Ok(())
    }

    async fn update_id(
        &self,
        collection: Collection,
        id: ObjectId,
        update: &Update,
    ) -> Result<(), DbError> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(&id))
            .ok_or(DbError::NotFound { collection, id })?;

        // Apply to a copy so a rejected update leaves the stored document intact.
        let mut updated = document.clone();
        update.apply(&mut updated)?;
        *document = updated;
        Ok(())
    }

    async fn remove_id(&self, collection: Collection, id: ObjectId) -> Result<(), DbError> {
        if let Some(docs) = self.collections.write().await.get_mut(&collection) {
            docs.remove(&id);
        }
        Ok(())
    }

    async fn remove(&self, collection: Collection, filter: &Filter) -> Result<usize, DbError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|_, doc| !filter.matches(doc));
        Ok(before.saturating_sub(docs.len()))
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Cursor, DbError> {
        let collections = self.collections.read().await;
        let matching: Vec<Value> = collections
            .get(&collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(Cursor::new(matching))
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<usize, DbError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).map_or(0, |docs| {
            docs.values().filter(|doc| filter.matches(doc)).count()
        }))
    }

    async fn drop_collection(&self, collection: Collection) -> Result<(), DbError> {
        self.collections.write().await.remove(&collection);
        Ok(())
    }
}
