//! Collection resolution.
//!
//! Every [`EntityKind`] is stored in exactly one [`Collection`].
//! [`collection_for`] is the single place that mapping lives; it is an
//! exhaustive match so a new entity kind cannot be added without choosing
//! its collection.

use kmud_types::EntityKind;
use serde::{Deserialize, Serialize};

/// A named collection of documents in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Login accounts.
    Users,
    /// Player characters.
    Characters,
    /// Rooms.
    Rooms,
    /// Zones.
    Zones,
    /// Items.
    Items,
    /// Areas.
    Areas,
}

impl Collection {
    /// Every collection.
    pub const ALL: [Self; 6] = [
        Self::Users,
        Self::Characters,
        Self::Rooms,
        Self::Zones,
        Self::Items,
        Self::Areas,
    ];

    /// Name of the collection inside the store.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Characters => "characters",
            Self::Rooms => "rooms",
            Self::Zones => "zones",
            Self::Items => "items",
            Self::Areas => "areas",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve the collection responsible for entities of `kind`.
pub const fn collection_for(kind: EntityKind) -> Collection {
    match kind {
        EntityKind::Character => Collection::Characters,
        EntityKind::User => Collection::Users,
        EntityKind::Zone => Collection::Zones,
        EntityKind::Area => Collection::Areas,
        EntityKind::Room => Collection::Rooms,
        EntityKind::Item => Collection::Items,
    }
}

/// Document field names shared by store filters.
pub mod fields {
    /// Identity key of every document.
    pub const ID: &str = "_id";
    /// Display name of zones, areas, items, characters and users.
    pub const NAME: &str = "name";
    /// Owning zone of rooms and areas.
    pub const ZONE_ID: &str = "zone_id";
    /// Owning user of a character.
    pub const USER_ID: &str = "user_id";
    /// Item ids held by a room or character.
    pub const ITEMS: &str = "items";
}
