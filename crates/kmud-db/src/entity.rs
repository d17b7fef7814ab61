//! The entity base shared by every persisted domain object.
//!
//! An [`Entity`] pairs a plain, serializable [`Document`] with everything
//! the write-back layer needs: an immutable [`ObjectId`], the entity's
//! [`EntityKind`], a per-entity read/write lock, a write-once destroyed
//! flag and a sender onto the dirty queue.
//!
//! Field access goes through two helpers:
//!
//! - [`Entity::read`] runs a closure under the shared lock.
//! - [`Entity::set`] / [`Entity::modify`] run a closure under the exclusive
//!   lock and, when something changed, enqueue a dirty notification once
//!   the lock is released.
//!
//! Enqueueing never happens under the entity's own lock: the committer
//! needs that lock to drain the notification, and a full queue may hand
//! its next free slot to a different waiting setter.
//!
//! Live entities are always held in an [`Arc`]; the entity keeps a weak
//! reference to itself so a setter can hand its own handle to the queue.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use kmud_types::{EntityKind, ObjectId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::collection::Collection;
use crate::database::Database;
use crate::dirty::{CommitOutcome, Dirty, DirtyQueue};
use crate::error::DbError;
use crate::store::Store;

/// Plain data of one entity kind, as stored in its collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Kind of every entity carrying this data.
    const KIND: EntityKind;
}

/// A detached snapshot: identity plus plain data, no lock.
///
/// This is what bulk reads return. Serializes as the stored document, with
/// the id under `_id` and the data's fields flattened beside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<T> {
    /// Identity of the entity.
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// The entity's fields.
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Record<T> {
    /// The document this record is stored as.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the data does not serialize.
    pub fn to_document(&self) -> Result<Value, DbError> {
        Ok(serde_json::to_value(self)?)
    }
}

struct State<T> {
    destroyed: bool,
    data: T,
}

/// A live, lockable, persisted domain object.
pub struct Entity<T: Document> {
    id: ObjectId,
    this: Weak<Self>,
    dirty: DirtyQueue,
    state: RwLock<State<T>>,
}

impl<T: Document> Entity<T> {
    /// Construct a new entity with a fresh id and queue its first commit.
    pub async fn create(db: &Database, data: T) -> Arc<Self> {
        let entity = Self::build(db.dirty().clone(), ObjectId::new(), data);
        tracing::debug!(id = %entity.id, kind = %T::KIND, "Created entity");
        entity.mark_dirty().await;
        entity
    }

    /// Turn a snapshot read from the store back into a live entity.
    ///
    /// Nothing is queued; the store already holds this state.
    pub fn attach(db: &Database, record: Record<T>) -> Arc<Self> {
        Self::build(db.dirty().clone(), record.id, record.data)
    }

    fn build(dirty: DirtyQueue, id: ObjectId, data: T) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            id,
            this: this.clone(),
            dirty,
            state: RwLock::new(State {
                destroyed: false,
                data,
            }),
        })
    }

    /// Identity of this entity. Never changes, needs no lock.
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Kind of this entity. Never changes, needs no lock.
    pub const fn kind(&self) -> EntityKind {
        T::KIND
    }

    /// Acquire the shared lock. Released when the guard drops.
    pub async fn shared(&self) -> Shared<'_, T> {
        Shared {
            guard: self.state.read().await,
        }
    }

    /// Acquire the exclusive lock. Released when the guard drops.
    ///
    /// Changes made through the guard are only persisted if the caller
    /// finishes with [`Exclusive::modified`].
    pub async fn exclusive(&self) -> Exclusive<'_, T> {
        Exclusive {
            entity: self,
            guard: self.state.write().await,
        }
    }

    /// Run `view` under the shared lock.
    pub async fn read<R>(&self, view: impl FnOnce(&T) -> R + Send) -> R {
        let guard = self.shared().await;
        view(&*guard)
    }

    /// Run `mutate` under the exclusive lock.
    ///
    /// `mutate` reports whether it changed anything; if it did, a dirty
    /// notification is queued after the lock is released. Returns that
    /// report.
    pub async fn modify(&self, mutate: impl FnOnce(&mut T) -> bool + Send) -> bool {
        let mut guard = self.exclusive().await;
        let changed = mutate(&mut *guard);
        if changed {
            guard.modified().await;
        }
        changed
    }

    /// Replace the field selected by `field` with `value`.
    ///
    /// A no-op returning `false` when the field already holds `value`.
    pub async fn set<V>(&self, field: impl FnOnce(&mut T) -> &mut V + Send, value: V) -> bool
    where
        V: PartialEq + Send,
    {
        self.modify(|data| {
            let slot = field(data);
            if *slot == value {
                false
            } else {
                *slot = value;
                true
            }
        })
        .await
    }

    /// Queue a commit of the current state without changing anything.
    pub async fn mark_dirty(&self) {
        if let Some(handle) = self.this.upgrade() {
            self.dirty.notify(handle).await;
        }
    }

    /// Mark the entity destroyed. Returns `true` only for the first call.
    ///
    /// A destroyed entity is never written to the store again, even by
    /// notifications already queued.
    pub async fn mark_destroyed(&self) -> bool {
        let mut guard = self.state.write().await;
        let first = !guard.destroyed;
        guard.destroyed = true;
        first
    }

    /// Whether [`Entity::mark_destroyed`] has been called.
    pub async fn is_destroyed(&self) -> bool {
        self.state.read().await.destroyed
    }

    /// A detached copy of the current state.
    pub async fn snapshot(&self) -> Record<T>
    where
        T: Clone,
    {
        Record {
            id: self.id,
            data: self.read(T::clone).await,
        }
    }
}

impl<T: Document> core::fmt::Debug for Entity<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("kind", &T::KIND)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Document> Dirty for Entity<T> {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn kind(&self) -> EntityKind {
        T::KIND
    }

    async fn commit(
        &self,
        store: &dyn Store,
        collection: Collection,
    ) -> Result<CommitOutcome, DbError> {
        let guard = self.state.read().await;
        if guard.destroyed {
            return Ok(CommitOutcome::Skipped);
        }
        let document = serde_json::to_value(&guard.data)?;
        store.upsert_id(collection, self.id, document).await?;
        Ok(CommitOutcome::Written)
    }
}

// =========================================================================
// Guards
// =========================================================================

/// Shared-lock guard dereferencing to the entity's data.
pub struct Shared<'a, T> {
    guard: RwLockReadGuard<'a, State<T>>,
}

impl<T> Deref for Shared<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard.data
    }
}

/// Exclusive-lock guard dereferencing mutably to the entity's data.
pub struct Exclusive<'a, T: Document> {
    entity: &'a Entity<T>,
    guard: RwLockWriteGuard<'a, State<T>>,
}

impl<T: Document> Exclusive<'_, T> {
    /// Whether the entity has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.guard.destroyed
    }

    /// Release the lock, then queue a dirty notification.
    ///
    /// Destroyed entities are not queued.
    pub async fn modified(self) {
        let Self { entity, guard } = self;
        let destroyed = guard.destroyed;
        drop(guard);
        if destroyed {
            tracing::trace!(id = %entity.id, "Mutation of destroyed entity not queued");
            return;
        }
        entity.mark_dirty().await;
    }
}

impl<T: Document> Deref for Exclusive<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard.data
    }
}

impl<T: Document> DerefMut for Exclusive<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard.data
    }
}
