//! Identifier wrapper around [`Uuid`].
//!
//! Every entity stored in the document store is keyed by an [`ObjectId`].
//! Ids use UUID v7 (time-ordered) so documents created close together sort
//! close together in the store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique identity of a persisted entity.
///
/// Serializes transparently as the UUID string, which is the value stored
/// under the `_id` field of every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The nil id, used for references that point at nothing yet.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Whether this is the nil id.
    pub const fn is_nil(self) -> bool {
        self.0.is_nil()
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl core::str::FromStr for ObjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for ObjectId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<ObjectId> for Uuid {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique_and_not_nil() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
        assert!(!a.is_nil());
        assert!(ObjectId::nil().is_nil());
    }

    #[test]
    fn serializes_as_bare_uuid_string() {
        let id = ObjectId::new();
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json, Some(format!("\"{id}\"")));
    }

    #[test]
    fn parses_its_own_display() {
        let id = ObjectId::new();
        let parsed: Result<ObjectId, _> = id.to_string().parse();
        assert_eq!(parsed.ok(), Some(id));
        assert!("not-a-uuid".parse::<ObjectId>().is_err());
    }
}
