//! Persisted domain objects for the kmud world.
//!
//! Each object is a handle around a live [`kmud_db::Entity`]: reads take
//! the entity's shared lock, setters take its exclusive lock and queue a
//! dirty notification when something changed. The [`World`] registry owns
//! the handles and is the entry point for loading, creating and deleting
//! them.
//!
//! # Modules
//!
//! - [`zone`], [`area`], [`room`], [`item`], [`character`], [`user`] --
//!   the domain objects and their stored fields.
//! - [`world`] -- [`World`], the id-indexed registry.
//! - [`names`] -- display-name normalization.
//! - [`error`] -- [`WorldError`].

mod handle;

pub mod area;
pub mod character;
pub mod error;
pub mod item;
pub mod names;
pub mod room;
pub mod user;
pub mod world;
pub mod zone;

pub use area::{Area, AreaData};
pub use character::{Character, CharacterData};
pub use error::WorldError;
pub use item::{Item, ItemData, item_names};
pub use names::format_name;
pub use room::{Room, RoomData};
pub use user::{User, UserData};
pub use world::World;
pub use zone::{Zone, ZoneData};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::time::Duration;

    use kmud_db::{Database, MemoryStore};

    /// A fresh database over an in-memory store.
    pub(crate) fn memory_db() -> (Database, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Database::init(store.clone()), store)
    }

    /// Wait until the committer has finished with `processed` notifications.
    pub(crate) async fn settle(db: &Database, processed: u64) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while db.stats().processed() < processed {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }
}
