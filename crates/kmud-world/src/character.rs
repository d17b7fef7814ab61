//! Player characters.

use kmud_db::{Database, Document};
use kmud_types::{EntityKind, ObjectId};
use serde::{Deserialize, Serialize};

use crate::handle::{entity_handle, insert_unique, remove_present};
use crate::names::format_name;

/// Stored fields of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterData {
    /// Normalized display name.
    pub name: String,
    /// Owning user.
    pub user_id: ObjectId,
    /// Room the character stands in.
    pub room_id: ObjectId,
    /// Carried items, without duplicates.
    #[serde(default)]
    pub items: Vec<ObjectId>,
}

impl Document for CharacterData {
    const KIND: EntityKind = EntityKind::Character;
}

entity_handle! {
    /// A live character.
    Character => CharacterData
}

impl Character {
    /// Create a character for `user_id` standing in `room_id`.
    pub async fn create(db: &Database, name: &str, user_id: ObjectId, room_id: ObjectId) -> Self {
        Self::insert(
            db,
            CharacterData {
                name: format_name(name),
                user_id,
                room_id,
                items: Vec::new(),
            },
        )
        .await
    }

    /// Display name.
    pub async fn name(&self) -> String {
        self.read(|c| c.name.clone()).await
    }

    /// Rename the character. The new name is normalized first.
    pub async fn set_name(&self, name: &str) -> bool {
        self.set(|c| &mut c.name, format_name(name)).await
    }

    /// Owning user.
    pub async fn user_id(&self) -> ObjectId {
        self.read(|c| c.user_id).await
    }

    /// Room the character stands in.
    pub async fn room_id(&self) -> ObjectId {
        self.read(|c| c.room_id).await
    }

    /// Move the character to another room.
    pub async fn set_room_id(&self, room_id: ObjectId) -> bool {
        self.set(|c| &mut c.room_id, room_id).await
    }

    /// Pick up an item. A no-op if already carried.
    pub async fn add_item(&self, item_id: ObjectId) -> bool {
        self.modify(|c| insert_unique(&mut c.items, item_id)).await
    }

    /// Drop an item. A no-op if not carried.
    pub async fn remove_item(&self, item_id: ObjectId) -> bool {
        self.modify(|c| remove_present(&mut c.items, item_id)).await
    }

    /// Whether the item is carried.
    pub async fn has_item(&self, item_id: ObjectId) -> bool {
        self.read(|c| c.items.contains(&item_id)).await
    }

    /// Ids of the carried items.
    pub async fn item_ids(&self) -> Vec<ObjectId> {
        self.read(|c| c.items.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_db, settle};

    #[tokio::test]
    async fn moving_and_carrying_queue_commits() {
        let (db, _store) = memory_db();
        let hall = ObjectId::new();
        let cellar = ObjectId::new();
        let hero = Character::create(&db, "  aria ", ObjectId::new(), hall).await;
        assert_eq!(hero.name().await, "Aria");

        assert!(hero.set_room_id(cellar).await);
        assert!(!hero.set_room_id(cellar).await);
        assert_eq!(hero.room_id().await, cellar);

        let lamp = ObjectId::new();
        assert!(hero.add_item(lamp).await);
        assert!(!hero.add_item(lamp).await);
        assert_eq!(hero.item_ids().await, vec![lamp]);
        assert!(hero.remove_item(lamp).await);
        assert!(!hero.has_item(lamp).await);

        // create, move, pick up, drop
        settle(&db, 4).await;
        assert_eq!(db.stats().processed(), 4);
    }
}
