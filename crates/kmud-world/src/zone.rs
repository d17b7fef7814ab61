//! Zones: named groups of rooms.

use kmud_db::{Database, Document};
use kmud_types::EntityKind;
use serde::{Deserialize, Serialize};

use crate::handle::entity_handle;
use crate::names::format_name;

/// Stored fields of a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneData {
    /// Normalized display name.
    pub name: String,
}

impl Document for ZoneData {
    const KIND: EntityKind = EntityKind::Zone;
}

entity_handle! {
    /// A live zone.
    Zone => ZoneData
}

impl Zone {
    /// Create a zone. The name is normalized with [`format_name`].
    pub async fn create(db: &Database, name: &str) -> Self {
        Self::insert(
            db,
            ZoneData {
                name: format_name(name),
            },
        )
        .await
    }

    /// Display name.
    pub async fn name(&self) -> String {
        self.read(|z| z.name.clone()).await
    }

    /// Rename the zone. The new name is normalized first.
    pub async fn set_name(&self, name: &str) -> bool {
        self.set(|z| &mut z.name, format_name(name)).await
    }
}
