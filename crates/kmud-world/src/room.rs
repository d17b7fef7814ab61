//! Rooms: the cells of a zone's grid.
//!
//! A room knows its zone, its grid [`Coordinate`], which of the ten exit
//! directions are open and the ids of the items lying in it. Every setter
//! goes through the entity's exclusive lock and is a no-op when nothing
//! changes.

use std::collections::BTreeSet;

use kmud_db::{Database, Document};
use kmud_types::{Coordinate, EntityKind, ExitDirection, ObjectId};
use serde::{Deserialize, Serialize};

use crate::handle::{entity_handle, insert_unique, remove_present};

/// Title given to freshly created rooms.
pub const DEFAULT_TITLE: &str = "The Void";

/// Description given to freshly created rooms.
pub const DEFAULT_DESCRIPTION: &str = "You are floating in the blackness of space. Complete \
    darkness surrounds you in all directions. There is no escape, there is no hope, just the \
    emptiness. You are likely to be eaten by a grue.";

/// Stored fields of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomData {
    /// Zone the room belongs to.
    pub zone_id: ObjectId,
    /// Short title shown on entry.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Items lying in the room, without duplicates.
    #[serde(default)]
    pub items: Vec<ObjectId>,
    /// Position on the zone's grid.
    pub location: Coordinate,
    /// Open exits.
    #[serde(default)]
    pub exits: BTreeSet<ExitDirection>,
}

impl RoomData {
    /// A fresh room in `zone_id` at the origin with no exits.
    pub fn new(zone_id: ObjectId) -> Self {
        Self {
            zone_id,
            title: DEFAULT_TITLE.to_owned(),
            description: DEFAULT_DESCRIPTION.to_owned(),
            items: Vec::new(),
            location: Coordinate::default(),
            exits: BTreeSet::new(),
        }
    }
}

impl Document for RoomData {
    const KIND: EntityKind = EntityKind::Room;
}

entity_handle! {
    /// A live room.
    Room => RoomData
}

impl Room {
    /// Create a room in `zone_id` with the default title and description.
    pub async fn create(db: &Database, zone_id: ObjectId) -> Self {
        Self::insert(db, RoomData::new(zone_id)).await
    }

    /// Create a room in `zone_id` at `location`. Queues a single commit.
    pub async fn create_at(db: &Database, zone_id: ObjectId, location: Coordinate) -> Self {
        Self::insert(
            db,
            RoomData {
                location,
                ..RoomData::new(zone_id)
            },
        )
        .await
    }

    /// Short title.
    pub async fn title(&self) -> String {
        self.read(|r| r.title.clone()).await
    }

    /// Replace the title.
    pub async fn set_title(&self, title: &str) -> bool {
        self.set(|r| &mut r.title, title.to_owned()).await
    }

    /// Long description.
    pub async fn description(&self) -> String {
        self.read(|r| r.description.clone()).await
    }

    /// Replace the description.
    pub async fn set_description(&self, description: &str) -> bool {
        self.set(|r| &mut r.description, description.to_owned()).await
    }

    /// Position on the zone's grid.
    pub async fn location(&self) -> Coordinate {
        self.read(|r| r.location).await
    }

    /// Move the room on the grid.
    pub async fn set_location(&self, location: Coordinate) -> bool {
        self.set(|r| &mut r.location, location).await
    }

    /// Zone the room belongs to.
    pub async fn zone_id(&self) -> ObjectId {
        self.read(|r| r.zone_id).await
    }

    /// Move the room to another zone.
    pub async fn set_zone_id(&self, zone_id: ObjectId) -> bool {
        self.set(|r| &mut r.zone_id, zone_id).await
    }

    /// Whether an exit leads `direction`.
    pub async fn has_exit(&self, direction: ExitDirection) -> bool {
        self.read(|r| r.exits.contains(&direction)).await
    }

    /// Open or close the exit leading `direction`.
    pub async fn set_exit_enabled(&self, direction: ExitDirection, enabled: bool) -> bool {
        self.modify(|r| {
            if enabled {
                r.exits.insert(direction)
            } else {
                r.exits.remove(&direction)
            }
        })
        .await
    }

    /// Open exits, in [`ExitDirection::ALL`] order.
    pub async fn exits(&self) -> Vec<ExitDirection> {
        self.read(|r| r.exits.iter().copied().collect()).await
    }

    /// Put an item in the room. A no-op if it is already here.
    pub async fn add_item(&self, item_id: ObjectId) -> bool {
        self.modify(|r| insert_unique(&mut r.items, item_id)).await
    }

    /// Take an item out of the room. A no-op if it is not here.
    pub async fn remove_item(&self, item_id: ObjectId) -> bool {
        self.modify(|r| remove_present(&mut r.items, item_id)).await
    }

    /// Whether the item lies in the room.
    pub async fn has_item(&self, item_id: ObjectId) -> bool {
        self.read(|r| r.items.contains(&item_id)).await
    }

    /// Ids of the items lying in the room.
    pub async fn item_ids(&self) -> Vec<ObjectId> {
        self.read(|r| r.items.clone()).await
    }

    /// Grid position one step `direction` from this room.
    pub async fn next_location(&self, direction: ExitDirection) -> Coordinate {
        self.location().await.next(direction)
    }
}
