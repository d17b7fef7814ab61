//! Dirty queue and committer.
//!
//! Every mutation of a live entity ends with a dirty notification: the
//! entity's own handle pushed onto a bounded FIFO [`DirtyQueue`]. A single
//! [`Committer`] task drains that queue and, for each handle, re-reads the
//! entity's current state under its shared lock and upserts it.
//!
//! ```text
//! setter
//!   |
//!   +-- exclusive lock, mutate field, release
//!   +-- DirtyQueue::notify(handle) ---> [ bounded mpsc ] ---> Committer
//!                                                               |
//!                                     shared lock, serialize <--+
//!                                     Store::upsert_id       <--+
//! ```
//!
//! The queue is bounded: when the committer falls behind, `notify` waits
//! for a free slot and so throttles mutators. A waiting setter holds no
//! entity lock, so the committer can always drain. Notifications are not
//! deduplicated. Commit failures are logged and counted, never retried and
//! never reported to the mutator.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use kmud_types::{EntityKind, ObjectId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::collection::{Collection, collection_for};
use crate::error::DbError;
use crate::store::Store;

/// Default number of notifications the queue holds before `notify` waits.
pub const DIRTY_QUEUE_CAPACITY: usize = 10;

/// Result of committing one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The current state was upserted.
    Written,
    /// The entity is destroyed; nothing was written.
    Skipped,
}

/// Something the committer can persist.
///
/// Implemented by every live entity. `commit` must check the destroyed flag
/// and serialize under the same shared lock, and keep that lock until the
/// store write finishes, so a concurrent destroy cannot interleave.
#[async_trait]
pub trait Dirty: Send + Sync {
    /// Identity the document is keyed by.
    fn id(&self) -> ObjectId;

    /// Kind used to resolve the collection.
    fn kind(&self) -> EntityKind;

    /// Upsert the current state into `collection` unless destroyed.
    async fn commit(
        &self,
        store: &dyn Store,
        collection: Collection,
    ) -> Result<CommitOutcome, DbError>;
}

/// A queued dirty notification.
pub type DirtyHandle = Arc<dyn Dirty>;

// =========================================================================
// Queue
// =========================================================================

/// Sending half of the dirty queue, shared by every live entity.
#[derive(Debug, Clone)]
pub struct DirtyQueue {
    tx: mpsc::Sender<DirtyHandle>,
}

impl DirtyQueue {
    /// Create a queue holding at most `capacity` notifications.
    ///
    /// A capacity of zero is raised to one.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DirtyHandle>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueue a notification, waiting for a free slot if the queue is full.
    ///
    /// Never touches the entity's lock. If the committer is gone the
    /// notification is dropped with a warning.
    pub async fn notify(&self, handle: DirtyHandle) {
        if let Err(mpsc::error::SendError(handle)) = self.tx.send(handle).await {
            tracing::warn!(
                id = %handle.id(),
                kind = %handle.kind(),
                "Committer stopped, dropping dirty notification"
            );
        }
    }

    /// Maximum number of queued notifications.
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Notifications currently waiting for the committer.
    pub fn pending(&self) -> usize {
        self.tx.max_capacity().saturating_sub(self.tx.capacity())
    }
}

// =========================================================================
// Statistics
// =========================================================================

/// Running totals kept by the committer.
#[derive(Debug, Default)]
pub struct CommitStats {
    written: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

impl CommitStats {
    /// Notifications that produced a store write.
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Notifications dropped because the entity was destroyed.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Notifications whose store write failed.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Every notification the committer has finished with.
    pub fn processed(&self) -> u64 {
        self.written()
            .saturating_add(self.skipped())
            .saturating_add(self.failed())
    }

    fn record(&self, outcome: Result<CommitOutcome, &DbError>) {
        let counter = match outcome {
            Ok(CommitOutcome::Written) => &self.written,
            Ok(CommitOutcome::Skipped) => &self.skipped,
            Err(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

// =========================================================================
// Committer
// =========================================================================

/// The single background worker turning notifications into store writes.
pub struct Committer {
    rx: mpsc::Receiver<DirtyHandle>,
    store: Arc<dyn Store>,
    stats: Arc<CommitStats>,
}

impl Committer {
    /// Bind a queue receiver to the store it persists into.
    pub fn new(
        rx: mpsc::Receiver<DirtyHandle>,
        store: Arc<dyn Store>,
        stats: Arc<CommitStats>,
    ) -> Self {
        Self { rx, store, stats }
    }

    /// Run the committer on the current `tokio` runtime.
    ///
    /// The task ends once every [`DirtyQueue`] sender has been dropped.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drain the queue until it closes.
    pub async fn run(mut self) {
        tracing::debug!("Committer started");
        while let Some(handle) = self.rx.recv().await {
            self.commit(handle.as_ref()).await;
        }
        tracing::debug!("Committer stopped, dirty queue closed");
    }

    async fn commit(&self, handle: &dyn Dirty) {
        let id = handle.id();
        let kind = handle.kind();
        let collection = collection_for(kind);

        let result = handle.commit(self.store.as_ref(), collection).await;
        self.stats.record(result.as_ref().copied());

        match result {
            Ok(CommitOutcome::Written) => {
                tracing::debug!(%id, %kind, %collection, "Committed dirty object");
            }
            Ok(CommitOutcome::Skipped) => {
                tracing::trace!(%id, %kind, "Skipped commit of destroyed object");
            }
            Err(e) => {
                tracing::error!(%id, %kind, %collection, error = %e, "Failed to commit dirty object");
            }
        }
    }
}
