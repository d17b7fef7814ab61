//! Areas: named regions within a zone.

use kmud_db::{Database, Document};
use kmud_types::{EntityKind, ObjectId};
use serde::{Deserialize, Serialize};

use crate::handle::entity_handle;

/// Stored fields of an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaData {
    /// Display name.
    pub name: String,
    /// Zone the area belongs to.
    pub zone_id: ObjectId,
}

impl Document for AreaData {
    const KIND: EntityKind = EntityKind::Area;
}

entity_handle! {
    /// A live area.
    Area => AreaData
}

impl Area {
    /// Create an area in `zone_id`.
    pub async fn create(db: &Database, name: &str, zone_id: ObjectId) -> Self {
        Self::insert(
            db,
            AreaData {
                name: name.to_owned(),
                zone_id,
            },
        )
        .await
    }

    /// Display name.
    pub async fn name(&self) -> String {
        self.read(|a| a.name.clone()).await
    }

    /// Rename the area.
    pub async fn set_name(&self, name: &str) -> bool {
        self.set(|a| &mut a.name, name.to_owned()).await
    }

    /// Zone the area belongs to.
    pub async fn zone_id(&self) -> ObjectId {
        self.read(|a| a.zone_id).await
    }

    /// Move the area to another zone.
    pub async fn set_zone_id(&self, zone_id: ObjectId) -> bool {
        self.set(|a| &mut a.zone_id, zone_id).await
    }
}
