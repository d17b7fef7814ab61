//! Shared shape of the domain object handles.
//!
//! Every domain object is a cheap, cloneable handle around one live
//! [`kmud_db::Entity`]. The handle dereferences to the entity, so the
//! generic helpers (`id`, `read`, `set`, `mark_dirty`, ...) are available
//! alongside the object's typed accessors.

use kmud_types::ObjectId;

/// Declare a handle type wrapping `Arc<Entity<$data>>`.
macro_rules! entity_handle {
    ($(#[$meta:meta])* $handle:ident => $data:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $handle(std::sync::Arc<kmud_db::Entity<$data>>);

        impl $handle {
            /// Reattach a stored snapshot as a live object. Queues nothing.
            pub fn attach(db: &kmud_db::Database, record: kmud_db::Record<$data>) -> Self {
                Self(kmud_db::Entity::attach(db, record))
            }

            /// The shared entity behind this handle.
            pub const fn entity(&self) -> &std::sync::Arc<kmud_db::Entity<$data>> {
                &self.0
            }

            async fn insert(db: &kmud_db::Database, data: $data) -> Self {
                Self(kmud_db::Entity::create(db, data).await)
            }
        }

        impl std::ops::Deref for $handle {
            type Target = kmud_db::Entity<$data>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl PartialEq for $handle {
            fn eq(&self, other: &Self) -> bool {
                self.0.id() == other.0.id()
            }
        }

        impl Eq for $handle {}
    };
}

pub(crate) use entity_handle;

/// Append `id` unless already present. Returns whether it was added.
pub(crate) fn insert_unique(ids: &mut Vec<ObjectId>, id: ObjectId) -> bool {
    if ids.contains(&id) {
        false
    } else {
        ids.push(id);
        true
    }
}

/// Remove `id` if present. Returns whether it was removed.
pub(crate) fn remove_present(ids: &mut Vec<ObjectId>, id: ObjectId) -> bool {
    let before = ids.len();
    ids.retain(|held| *held != id);
    ids.len() != before
}
