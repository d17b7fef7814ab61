//! Items lying in rooms or carried by characters.

use kmud_db::{Database, Document};
use kmud_types::EntityKind;
use serde::{Deserialize, Serialize};

use crate::handle::entity_handle;
use crate::names::format_name;

/// Stored fields of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    /// Normalized display name.
    pub name: String,
}

impl Document for ItemData {
    const KIND: EntityKind = EntityKind::Item;
}

entity_handle! {
    /// A live item.
    Item => ItemData
}

impl Item {
    /// Create an item. The name is normalized with [`format_name`].
    pub async fn create(db: &Database, name: &str) -> Self {
        Self::insert(
            db,
            ItemData {
                name: format_name(name),
            },
        )
        .await
    }

    /// Display name.
    pub async fn name(&self) -> String {
        self.read(|i| i.name.clone()).await
    }

    /// Rename the item. The new name is normalized first.
    pub async fn set_name(&self, name: &str) -> bool {
        self.set(|i| &mut i.name, format_name(name)).await
    }
}

/// Display names of `items`, in the given order.
pub async fn item_names(items: &[Item]) -> Vec<String> {
    let mut names = Vec::with_capacity(items.len());
    for item in items {
        names.push(item.name().await);
    }
    names
}
