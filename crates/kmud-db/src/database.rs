//! The process-wide write-back context.
//!
//! [`Database::init`] binds a [`Store`], creates the dirty queue and spawns
//! the single [`Committer`]. The resulting handle is passed to every entity
//! constructor and to the synchronous operations: bulk reads, counts,
//! partial updates and deletes. Those synchronous paths return their errors
//! directly; the asynchronous commit path never does.
//!
//! There is no teardown. The committer stops once the last queue sender is
//! gone, and anything still queued at process exit is lost.

use std::sync::Arc;

use kmud_types::{EntityKind, ObjectId};

use crate::collection::collection_for;
use crate::dirty::{CommitStats, Committer, DIRTY_QUEUE_CAPACITY, DirtyQueue};
use crate::entity::{Document, Entity, Record};
use crate::error::DbError;
use crate::store::{Filter, Store, Update};

/// Handle to the store, the dirty queue and the committer's statistics.
///
/// Cheap to clone; every clone shares the same queue and committer.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn Store>,
    dirty: DirtyQueue,
    stats: Arc<CommitStats>,
}

impl Database {
    /// Bind `store` and start the committer with the default queue capacity.
    ///
    /// Must be called from within a `tokio` runtime, once per process.
    pub fn init(store: Arc<dyn Store>) -> Self {
        Self::with_queue_capacity(store, DIRTY_QUEUE_CAPACITY)
    }

    /// Like [`Database::init`] with an explicit dirty queue capacity.
    pub fn with_queue_capacity(store: Arc<dyn Store>, capacity: usize) -> Self {
        let (dirty, rx) = DirtyQueue::channel(capacity);
        let stats = Arc::new(CommitStats::default());
        Committer::new(rx, Arc::clone(&store), Arc::clone(&stats)).spawn();

        tracing::info!(
            queue_capacity = dirty.capacity(),
            "Write-back layer initialized"
        );
        Self {
            store,
            dirty,
            stats,
        }
    }

    pub(crate) const fn dirty(&self) -> &DirtyQueue {
        &self.dirty
    }

    /// The bound store.
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Committer statistics.
    pub fn stats(&self) -> &CommitStats {
        &self.stats
    }

    /// Notifications waiting for the committer.
    pub fn pending_commits(&self) -> usize {
        self.dirty.pending()
    }

    /// Read every stored document of kind `T` as detached snapshots.
    ///
    /// Meant for the initial world load, not for per-request lookups.
    pub async fn retrieve_all<T: Document>(&self) -> Result<Vec<Record<T>>, DbError> {
        self.find(&Filter::all()).await
    }

    /// Read the stored documents of kind `T` matching `filter`.
    pub async fn find<T: Document>(&self, filter: &Filter) -> Result<Vec<Record<T>>, DbError> {
        let collection = collection_for(T::KIND);
        let records = self.store.find(collection, filter).await?.all()?;
        tracing::debug!(%collection, count = records.len(), "Retrieved documents");
        Ok(records)
    }

    /// Read every stored document of kind `T` and reattach each as a live
    /// entity.
    pub async fn load_all<T: Document>(&self) -> Result<Vec<Arc<Entity<T>>>, DbError> {
        Ok(self
            .retrieve_all::<T>()
            .await?
            .into_iter()
            .map(|record| Entity::attach(self, record))
            .collect())
    }

    /// Number of stored documents of `kind` matching `filter`.
    pub async fn count(&self, kind: EntityKind, filter: &Filter) -> Result<usize, DbError> {
        self.store.count(collection_for(kind), filter).await
    }

    /// Apply a partial update directly to a stored document.
    ///
    /// Bypasses the live entity; a later commit of that entity overwrites
    /// the document with the entity's state.
    pub async fn update_id(
        &self,
        kind: EntityKind,
        id: ObjectId,
        update: &Update,
    ) -> Result<(), DbError> {
        self.store.update_id(collection_for(kind), id, update).await
    }

    /// Remove every stored document of `kind` matching `filter`.
    pub async fn remove_matching(
        &self,
        kind: EntityKind,
        filter: &Filter,
    ) -> Result<usize, DbError> {
        self.store.remove(collection_for(kind), filter).await
    }

    /// Destroy `entity` and synchronously remove its document.
    ///
    /// The entity is marked destroyed first, so queued notifications for it
    /// become no-ops; the removal then bypasses the dirty queue.
    pub async fn delete_object<T: Document>(&self, entity: &Entity<T>) -> Result<(), DbError> {
        entity.mark_destroyed().await;
        let collection = collection_for(entity.kind());
        self.store.remove_id(collection, entity.id()).await?;
        tracing::debug!(id = %entity.id(), %collection, "Deleted object");
        Ok(())
    }
}

impl core::fmt::Debug for Database {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Database")
            .field("dirty", &self.dirty)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::collection::fields;
    use crate::memory::MemoryStore;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Sign {
        name: String,
        tags: Vec<String>,
    }

    impl Document for Sign {
        const KIND: EntityKind = EntityKind::Area;
    }

    fn sign(name: &str) -> Sign {
        Sign {
            name: name.to_owned(),
            tags: Vec::new(),
        }
    }

    async fn settle(db: &Database, processed: u64) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while db.stats().processed() < processed {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn retrieve_all_returns_detached_snapshots() {
        let db = Database::init(Arc::new(MemoryStore::new()));
        let north = Entity::create(&db, sign("North")).await;
        let south = Entity::create(&db, sign("South")).await;
        settle(&db, 2).await;

        let mut records = db.retrieve_all::<Sign>().await.unwrap();
        records.sort_by_key(|r| r.id);
        let mut expected = vec![north.snapshot().await, south.snapshot().await];
        expected.sort_by_key(|r| r.id);
        assert_eq!(records, expected);

        let found = db
            .find::<Sign>(&Filter::eq(fields::NAME, "South"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(db.count(EntityKind::Area, &Filter::all()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn load_all_reattaches_live_entities() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let db = Database::init(store.clone());
        let original = Entity::create(&db, sign("Gate")).await;
        settle(&db, 1).await;

        let loaded = db.load_all::<Sign>().await.unwrap();
        assert_eq!(loaded.len(), 1);
        let live = loaded.first().unwrap();
        assert_eq!(live.id(), original.id());

        live.set(|s| &mut s.name, "Portcullis".to_owned()).await;
        settle(&db, 2).await;
        let stored = store
            .get(collection_for(EntityKind::Area), original.id())
            .await
            .unwrap();
        assert_eq!(stored.get(fields::NAME), Some(&"Portcullis".into()));
    }

    #[tokio::test]
    async fn delete_object_removes_and_destroys() {
        let store = Arc::new(MemoryStore::new());
        let db = Database::init(store.clone());
        let doomed = Entity::create(&db, sign("Doomed")).await;
        settle(&db, 1).await;

        db.delete_object(&doomed).await.unwrap();
        assert!(doomed.is_destroyed().await);
        assert!(store.is_empty().await);

        // Deleting twice is harmless.
        db.delete_object(&doomed).await.unwrap();
    }

    #[tokio::test]
    async fn update_and_remove_matching_reach_the_store() {
        let store = Arc::new(MemoryStore::new());
        let db = Database::init(store.clone());
        let board = Entity::create(&db, sign("Board")).await;
        let _other = Entity::create(&db, sign("Other")).await;
        settle(&db, 2).await;

        db.update_id(EntityKind::Area, board.id(), &Update::push("tags", "notice"))
            .await
            .unwrap();
        let stored = db
            .find::<Sign>(&Filter::eq("tags", "notice"))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored.first().map(|r| r.id), Some(board.id()));

        let removed = db
            .remove_matching(EntityKind::Area, &Filter::eq(fields::NAME, "Other"))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(db.count(EntityKind::Area, &Filter::all()).await.unwrap(), 1);
    }
}
