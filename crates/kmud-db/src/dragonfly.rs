//! `Dragonfly` (Redis-compatible) document store backend.
//!
//! Each collection is a single hash. The hash field is the document id and
//! the value is the JSON-encoded document, so an upsert is one `HSET` and a
//! keyed removal is one `HDEL`. Filtered reads fetch the whole hash and
//! filter in process; collections are sized for a game world, not for
//! analytics.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `{namespace}:users` | Hash | User documents keyed by id |
//! | `{namespace}:characters` | Hash | Character documents keyed by id |
//! | `{namespace}:zones` | Hash | Zone documents keyed by id |
//! | `{namespace}:areas` | Hash | Area documents keyed by id |
//! | `{namespace}:rooms` | Hash | Room documents keyed by id |
//! | `{namespace}:items` | Hash | Item documents keyed by id |

use async_trait::async_trait;
use fred::prelude::*;
use kmud_types::ObjectId;
use serde_json::Value;

use crate::collection::{Collection, fields};
use crate::error::DbError;
use crate::store::{Cursor, Filter, Store, Update, stamp_id};

/// Default key namespace, one per game database.
pub const DEFAULT_NAMESPACE: &str = "mud";

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`]; cloning shares the connection.
#[derive(Clone)]
pub struct DragonflyStore {
    client: Client,
    namespace: String,
}

impl DragonflyStore {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str, namespace: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!(namespace, "Connected to Dragonfly");
        Ok(Self {
            client,
            namespace: namespace.to_owned(),
        })
    }

    /// The key prefix shared by every collection hash.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Hash key holding `collection`.
    pub fn key(&self, collection: Collection) -> String {
        format!("{}:{}", self.namespace, collection.name())
    }

    /// Every document in `collection`, decoded but unfiltered.
    async fn documents(&self, collection: Collection) -> Result<Vec<Value>, DbError> {
        let raw: Vec<String> = self.client.hvals(self.key(collection)).await?;
        raw.iter()
            .map(|json| parse_document(collection, json))
            .collect()
    }

    /// Flush all keys from the `Dragonfly` instance.
    ///
    /// **WARNING:** This deletes all data. Only use for testing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the flush fails.
    pub async fn flush_all(&self) -> Result<(), DbError> {
        let _: () = self.client.flushall(false).await?;
        Ok(())
    }

    /// Return a reference to the underlying [`Client`].
    pub const fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Store for DragonflyStore {
    async fn upsert_id(
        &self,
        collection: Collection,
        id: ObjectId,
        document: Value,
    ) -> Result<(), DbError> {
        let document = stamp_id(collection, id, document)?;
        let json = serde_json::to_string(&document)?;
        let _: u64 = self
            .client
            .hset(self.key(collection), (id.to_string(), json))
            .await?;
        Ok(())
    }

    async fn update_id(
        &self,
        collection: Collection,
        id: ObjectId,
        update: &Update,
    ) -> Result<(), DbError> {
        let key = self.key(collection);
        let raw: Option<String> = self.client.hget(key.as_str(), id.to_string()).await?;
        let raw = raw.ok_or(DbError::NotFound { collection, id })?;

        let mut document = parse_document(collection, &raw)?;
        update.apply(&mut document)?;

        let json = serde_json::to_string(&document)?;
        let _: u64 = self.client.hset(key, (id.to_string(), json)).await?;
        Ok(())
    }

    async fn remove_id(&self, collection: Collection, id: ObjectId) -> Result<(), DbError> {
        let _: u64 = self
            .client
            .hdel(self.key(collection), id.to_string())
            .await?;
        Ok(())
    }

    async fn remove(&self, collection: Collection, filter: &Filter) -> Result<usize, DbError> {
        let ids: Vec<String> = self
            .documents(collection)
            .await?
            .iter()
            .filter(|doc| filter.matches(doc))
            .filter_map(|doc| doc.get(fields::ID).and_then(Value::as_str))
            .map(str::to_owned)
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let removed: u64 = self.client.hdel(self.key(collection), ids).await?;
        Ok(usize::try_from(removed).unwrap_or(usize::MAX))
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Cursor, DbError> {
        let mut documents = self.documents(collection).await?;
        documents.retain(|doc| filter.matches(doc));
        Ok(Cursor::new(documents))
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<usize, DbError> {
        if filter.is_empty() {
            let len: u64 = self.client.hlen(self.key(collection)).await?;
            return Ok(usize::try_from(len).unwrap_or(usize::MAX));
        }
        let documents = self.documents(collection).await?;
        Ok(documents.iter().filter(|doc| filter.matches(doc)).count())
    }

    async fn drop_collection(&self, collection: Collection) -> Result<(), DbError> {
        let _: u32 = self.client.del(self.key(collection)).await?;
        Ok(())
    }
}

/// Decode a stored hash value, insisting on a JSON object.
fn parse_document(collection: Collection, raw: &str) -> Result<Value, DbError> {
    let document: Value = serde_json::from_str(raw)?;
    if document.is_object() {
        Ok(document)
    } else {
        Err(DbError::MalformedDocument {
            collection,
            reason: format!("expected an object, found {document}"),
        })
    }
}
