//! Dirty-object write-back layer for the kmud world.
//!
//! Domain objects live in memory and are the source of truth for every
//! live read. Each mutation marks the object dirty; a single background
//! committer eventually writes the object's current state to a document
//! store. Mutators never wait for persistence, only for queue space.
//!
//! # Architecture
//!
//! ```text
//! Entity::set / modify  (exclusive lock)
//!     |
//!     +-- DirtyQueue (bounded FIFO) --> Committer (one task)
//!                                          |
//!                                          +-- collection_for(kind)
//!                                          +-- shared lock + serialize
//!                                          +-- Store::upsert_id
//!
//! Database::retrieve_all / find / count / delete_object --> Store (direct)
//! ```
//!
//! # Modules
//!
//! - [`collection`] -- entity kind to collection resolution
//! - [`database`] -- the [`Database`] context created by [`Database::init`]
//! - [`dirty`] -- dirty queue, committer and commit statistics
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) store backend
//! - [`entity`] -- the lockable [`Entity`] base and its guards
//! - [`memory`] -- in-process store backend
//! - [`store`] -- the [`Store`] facade, filters, updates and cursors
//! - [`error`] -- shared error types

pub mod collection;
pub mod database;
pub mod dirty;
pub mod dragonfly;
pub mod entity;
pub mod error;
pub mod memory;
pub mod store;

// Re-export primary types for convenience.
pub use collection::{Collection, collection_for, fields};
pub use database::Database;
pub use dirty::{CommitOutcome, CommitStats, DIRTY_QUEUE_CAPACITY, Dirty, DirtyQueue};
pub use dragonfly::DragonflyStore;
pub use entity::{Document, Entity, Exclusive, Record, Shared};
pub use error::DbError;
pub use memory::MemoryStore;
pub use store::{Cursor, Filter, Store, Update};
