//! The world registry: every live object, indexed by id.
//!
//! [`World::load`] reads each collection once and reattaches the snapshots
//! as live objects; nothing is queued by the load. From then on objects
//! are created through the registry so they are indexed, and deleted
//! through it so they are destroyed, removed from the store and dropped
//! from the index in one step.

use std::collections::BTreeMap;

use kmud_db::{Database, Document, Entity, Record};
use kmud_types::{Coordinate, EntityKind, ObjectId};

use crate::area::Area;
use crate::character::Character;
use crate::error::WorldError;
use crate::item::Item;
use crate::room::Room;
use crate::user::User;
use crate::zone::Zone;

/// Every live domain object of one game.
#[derive(Debug)]
pub struct World {
    db: Database,
    zones: BTreeMap<ObjectId, Zone>,
    areas: BTreeMap<ObjectId, Area>,
    rooms: BTreeMap<ObjectId, Room>,
    items: BTreeMap<ObjectId, Item>,
    users: BTreeMap<ObjectId, User>,
    characters: BTreeMap<ObjectId, Character>,
}

impl World {
    /// An empty registry over `db`.
    pub const fn new(db: Database) -> Self {
        Self {
            db,
            zones: BTreeMap::new(),
            areas: BTreeMap::new(),
            rooms: BTreeMap::new(),
            items: BTreeMap::new(),
            users: BTreeMap::new(),
            characters: BTreeMap::new(),
        }
    }

    /// Read every stored object and reattach it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Db`] if any collection cannot be read or holds
    /// a document that does not decode.
    pub async fn load(db: Database) -> Result<Self, WorldError> {
        let mut world = Self::new(db);
        world.zones = load_kind(&world.db, Zone::attach).await?;
        world.areas = load_kind(&world.db, Area::attach).await?;
        world.rooms = load_kind(&world.db, Room::attach).await?;
        world.items = load_kind(&world.db, Item::attach).await?;
        world.users = load_kind(&world.db, User::attach).await?;
        world.characters = load_kind(&world.db, Character::attach).await?;

        tracing::info!(
            zones = world.zones.len(),
            areas = world.areas.len(),
            rooms = world.rooms.len(),
            items = world.items.len(),
            users = world.users.len(),
            characters = world.characters.len(),
            "World loaded"
        );
        Ok(world)
    }

    /// The write-back context the objects persist through.
    pub const fn db(&self) -> &Database {
        &self.db
    }

    /// Create a zone named `zone_name` and its origin room if no zone exists.
    ///
    /// Returns the new zone, or `None` if the world already had one.
    pub async fn seed_if_empty(&mut self, zone_name: &str) -> Option<Zone> {
        if !self.zones.is_empty() {
            return None;
        }
        let zone = self.create_zone(zone_name).await;
        let room = Room::create(&self.db, zone.id()).await;
        tracing::info!(zone = %zone.id(), room = %room.id(), "Seeded empty world");
        self.rooms.insert(room.id(), room);
        Some(zone)
    }

    // -------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------

    /// Create and register a zone.
    pub async fn create_zone(&mut self, name: &str) -> Zone {
        let zone = Zone::create(&self.db, name).await;
        self.zones.insert(zone.id(), zone.clone());
        zone
    }

    /// Create and register an area in an existing zone.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotFound`] if the zone is unknown.
    pub async fn create_area(&mut self, name: &str, zone_id: ObjectId) -> Result<Area, WorldError> {
        self.require_zone(zone_id)?;
        let area = Area::create(&self.db, name, zone_id).await;
        self.areas.insert(area.id(), area.clone());
        Ok(area)
    }

    /// Create and register a room at `location` in an existing zone.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotFound`] if the zone is unknown.
    pub async fn create_room(
        &mut self,
        zone_id: ObjectId,
        location: Coordinate,
    ) -> Result<Room, WorldError> {
        self.require_zone(zone_id)?;
        let room = Room::create_at(&self.db, zone_id, location).await;
        self.rooms.insert(room.id(), room.clone());
        Ok(room)
    }

    /// Create and register an item.
    pub async fn create_item(&mut self, name: &str) -> Item {
        let item = Item::create(&self.db, name).await;
        self.items.insert(item.id(), item.clone());
        item
    }

    /// Create and register a user.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NameTaken`] if a live user already has the name.
    pub async fn create_user(&mut self, name: &str) -> Result<User, WorldError> {
        if self.user_by_name(name).await.is_some() {
            return Err(WorldError::NameTaken(name.to_owned()));
        }
        let user = User::create(&self.db, name).await;
        self.users.insert(user.id(), user.clone());
        Ok(user)
    }

    /// Create and register a character for an existing user in an existing room.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotFound`] if the user or the room is unknown.
    pub async fn create_character(
        &mut self,
        name: &str,
        user_id: ObjectId,
        room_id: ObjectId,
    ) -> Result<Character, WorldError> {
        if !self.users.contains_key(&user_id) {
            return Err(not_found(EntityKind::User, user_id));
        }
        if !self.rooms.contains_key(&room_id) {
            return Err(not_found(EntityKind::Room, room_id));
        }
        let character = Character::create(&self.db, name, user_id, room_id).await;
        self.characters.insert(character.id(), character.clone());
        Ok(character)
    }

    // -------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------

    /// Zone by id.
    pub fn zone(&self, id: ObjectId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    /// Area by id.
    pub fn area(&self, id: ObjectId) -> Option<&Area> {
        self.areas.get(&id)
    }

    /// Room by id.
    pub fn room(&self, id: ObjectId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    /// Item by id.
    pub fn item(&self, id: ObjectId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// User by id.
    pub fn user(&self, id: ObjectId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Character by id.
    pub fn character(&self, id: ObjectId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Every zone.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// Every room.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Rooms belonging to `zone_id`.
    pub async fn rooms_in_zone(&self, zone_id: ObjectId) -> Vec<Room> {
        let mut found = Vec::new();
        for room in self.rooms.values() {
            if room.zone_id().await == zone_id {
                found.push(room.clone());
            }
        }
        found
    }

    /// Room of `zone_id` standing at `location`.
    pub async fn room_at(&self, zone_id: ObjectId, location: Coordinate) -> Option<Room> {
        for room in self.rooms.values() {
            let here = room.read(|r| r.zone_id == zone_id && r.location == location).await;
            if here {
                return Some(room.clone());
            }
        }
        None
    }

    /// User called `name`, compared case-insensitively.
    pub async fn user_by_name(&self, name: &str) -> Option<User> {
        for user in self.users.values() {
            if user.read(|u| u.name.eq_ignore_ascii_case(name)).await {
                return Some(user.clone());
            }
        }
        None
    }

    /// Characters owned by `user_id`.
    pub async fn characters_of(&self, user_id: ObjectId) -> Vec<Character> {
        let mut found = Vec::new();
        for character in self.characters.values() {
            if character.user_id().await == user_id {
                found.push(character.clone());
            }
        }
        found
    }

    // -------------------------------------------------------------------
    // Deletion
    // -------------------------------------------------------------------

    /// Destroy a zone, remove its document and unregister it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotFound`] if unknown, [`WorldError::Db`] if
    /// the removal fails.
    pub async fn delete_zone(&mut self, id: ObjectId) -> Result<(), WorldError> {
        delete_from(&self.db, &mut self.zones, id).await
    }

    /// Destroy an area, remove its document and unregister it.
    ///
    /// # Errors
    ///
    /// As [`World::delete_zone`].
    pub async fn delete_area(&mut self, id: ObjectId) -> Result<(), WorldError> {
        delete_from(&self.db, &mut self.areas, id).await
    }

    /// Destroy a room, remove its document and unregister it.
    ///
    /// # Errors
    ///
    /// As [`World::delete_zone`].
    pub async fn delete_room(&mut self, id: ObjectId) -> Result<(), WorldError> {
        delete_from(&self.db, &mut self.rooms, id).await
    }

    /// Destroy an item, remove its document and unregister it.
    ///
    /// # Errors
    ///
    /// As [`World::delete_zone`].
    pub async fn delete_item(&mut self, id: ObjectId) -> Result<(), WorldError> {
        delete_from(&self.db, &mut self.items, id).await
    }

    /// Destroy a user, remove its document and unregister it.
    ///
    /// # Errors
    ///
    /// As [`World::delete_zone`].
    pub async fn delete_user(&mut self, id: ObjectId) -> Result<(), WorldError> {
        delete_from(&self.db, &mut self.users, id).await
    }

    /// Destroy a character, remove its document and unregister it.
    ///
    /// # Errors
    ///
    /// As [`World::delete_zone`].
    pub async fn delete_character(&mut self, id: ObjectId) -> Result<(), WorldError> {
        delete_from(&self.db, &mut self.characters, id).await
    }

    fn require_zone(&self, zone_id: ObjectId) -> Result<(), WorldError> {
        if self.zones.contains_key(&zone_id) {
            Ok(())
        } else {
            Err(not_found(EntityKind::Zone, zone_id))
        }
    }
}

const fn not_found(kind: EntityKind, id: ObjectId) -> WorldError {
    WorldError::NotFound { kind, id }
}

async fn load_kind<T, H>(
    db: &Database,
    attach: impl Fn(&Database, Record<T>) -> H,
) -> Result<BTreeMap<ObjectId, H>, WorldError>
where
    T: Document,
{
    Ok(db
        .retrieve_all::<T>()
        .await?
        .into_iter()
        .map(|record| (record.id, attach(db, record)))
        .collect())
}

async fn delete_from<T, H>(
    db: &Database,
    index: &mut BTreeMap<ObjectId, H>,
    id: ObjectId,
) -> Result<(), WorldError>
where
    T: Document,
    H: std::ops::Deref<Target = Entity<T>>,
{
    let handle = index.get(&id).ok_or_else(|| not_found(T::KIND, id))?;
    db.delete_object(&**handle).await?;
    index.remove(&id);
    Ok(())
}
