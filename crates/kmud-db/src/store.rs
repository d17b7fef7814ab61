//! The store facade.
//!
//! [`Store`] is the whole contract the write-back layer needs from a
//! document store: keyed upsert, keyed and filtered removal, filtered find
//! returning a [`Cursor`], filtered count, and the `set`/`push`/`pull`
//! partial updates domain code uses. Schema, indexing and connection
//! management belong to the backend.
//!
//! Documents are JSON objects carrying their identity under `_id`.

use async_trait::async_trait;
use kmud_types::ObjectId;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::collection::{Collection, fields};
use crate::error::DbError;

// =========================================================================
// Filter
// =========================================================================

/// A conjunction of top-level field equality conditions.
///
/// A condition on an array field matches when the array contains the
/// value. A condition whose value is `null` also matches documents that
/// lack the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// A filter matching every document.
    pub const fn all() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    /// A filter matching documents whose `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    /// Add another equality condition.
    #[must_use]
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    /// Whether this filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether `document` satisfies every condition.
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| match document.get(field) {
                Some(Value::Array(values)) if !expected.is_array() => values.contains(expected),
                Some(actual) => actual == expected,
                None => expected.is_null(),
            })
    }
}

// =========================================================================
// Update
// =========================================================================

/// A partial update applied to a single document.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Replace the value of a field.
    Set {
        /// Target field.
        field: String,
        /// New value.
        value: Value,
    },
    /// Append to an array field, creating it when absent.
    Push {
        /// Target array field.
        field: String,
        /// Element to append.
        value: Value,
    },
    /// Remove every element equal to `value` from an array field.
    Pull {
        /// Target array field.
        field: String,
        /// Element to remove.
        value: Value,
    },
}

impl Update {
    /// `$set` equivalent.
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Set {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `$push` equivalent.
    pub fn push(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Push {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `$pull` equivalent.
    pub fn pull(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Pull {
            field: field.into(),
            value: value.into(),
        }
    }

    /// The field this update targets.
    pub fn field(&self) -> &str {
        match self {
            Self::Set { field, .. } | Self::Push { field, .. } | Self::Pull { field, .. } => field,
        }
    }

    /// Apply the update to `document` in place.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidUpdate`] if the update targets `_id`, the
    /// document is not an object, or an array operation meets a non-array.
    pub fn apply(&self, document: &mut Value) -> Result<(), DbError> {
        let field = self.field();
        if field == fields::ID {
            return Err(invalid(field, "the identity field is immutable"));
        }
        let object = document
            .as_object_mut()
            .ok_or_else(|| invalid(field, "document is not an object"))?;

        match self {
            Self::Set { field, value } => {
                object.insert(field.clone(), value.clone());
            }
            Self::Push { field, value } => {
                let slot = object
                    .entry(field.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                slot.as_array_mut()
                    .ok_or_else(|| invalid(field, "push target is not an array"))?
                    .push(value.clone());
            }
            Self::Pull { field, value } => match object.get_mut(field.as_str()) {
                None => {}
                Some(Value::Array(values)) => values.retain(|v| v != value),
                Some(_) => return Err(invalid(field, "pull target is not an array")),
            },
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> DbError {
    DbError::InvalidUpdate {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
}

// =========================================================================
// Cursor
// =========================================================================

/// Result set of a [`Store::find`].
///
/// Documents are held as raw JSON and only deserialized into a caller type
/// when taken from the cursor.
#[derive(Debug, Default)]
pub struct Cursor {
    documents: std::vec::IntoIter<Value>,
}

impl Cursor {
    /// Wrap a set of raw documents.
    pub fn new(documents: Vec<Value>) -> Self {
        Self {
            documents: documents.into_iter(),
        }
    }

    /// Number of documents not yet taken.
    pub fn remaining(&self) -> usize {
        self.documents.len()
    }

    /// Take and deserialize the next document.
    pub fn next_as<T: DeserializeOwned>(&mut self) -> Option<Result<T, DbError>> {
        self.documents
            .next()
            .map(|doc| serde_json::from_value(doc).map_err(DbError::from))
    }

    /// Deserialize every remaining document into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] on the first document that does
    /// not fit `T`.
    pub fn all<T: DeserializeOwned>(mut self) -> Result<Vec<T>, DbError> {
        let mut out = Vec::with_capacity(self.remaining());
        while let Some(item) = self.next_as() {
            out.push(item?);
        }
        Ok(out)
    }

    /// Deserialize the first remaining document, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if it does not fit `T`.
    pub fn one<T: DeserializeOwned>(mut self) -> Result<Option<T>, DbError> {
        self.next_as().transpose()
    }
}

impl Iterator for Cursor {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.documents.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.documents.size_hint()
    }
}

impl ExactSizeIterator for Cursor {}

// =========================================================================
// Store
// =========================================================================

/// A document store holding one keyed set of documents per [`Collection`].
///
/// Implementations must be safe to share between tasks. The committer is
/// the only writer on the asynchronous path; synchronous callers use the
/// same handle for bulk reads and deletes.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert `document` under `id`, replacing any existing document.
    ///
    /// The stored document's `_id` field is always set to `id`.
    async fn upsert_id(
        &self,
        collection: Collection,
        id: ObjectId,
        document: Value,
    ) -> Result<(), DbError>;

    /// Apply a partial update to the document stored under `id`.
    ///
    /// Returns [`DbError::NotFound`] if there is no such document.
    async fn update_id(
        &self,
        collection: Collection,
        id: ObjectId,
        update: &Update,
    ) -> Result<(), DbError>;

    /// Remove the document stored under `id`. Removing an absent id succeeds.
    async fn remove_id(&self, collection: Collection, id: ObjectId) -> Result<(), DbError>;

    /// Remove every document matching `filter`, returning how many were removed.
    async fn remove(&self, collection: Collection, filter: &Filter) -> Result<usize, DbError>;

    /// Every document matching `filter`.
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Cursor, DbError>;

    /// Number of documents matching `filter`.
    async fn count(&self, collection: Collection, filter: &Filter) -> Result<usize, DbError>;

    /// Remove the whole collection.
    async fn drop_collection(&self, collection: Collection) -> Result<(), DbError>;
}

/// Force the `_id` field of `document` to `id`.
pub(crate) fn stamp_id(
    collection: Collection,
    id: ObjectId,
    document: Value,
) -> Result<Map<String, Value>, DbError> {
    match document {
        Value::Object(mut object) => {
            object.insert(fields::ID.to_owned(), Value::String(id.to_string()));
            Ok(object)
        }
        other => Err(DbError::MalformedDocument {
            collection,
            reason: format!("expected an object, found {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn filter_matches_scalars_and_array_members() {
        let doc = json!({ "name": "Rock", "items": ["a", "b"] });
        assert!(Filter::all().matches(&doc));
        assert!(Filter::eq("name", "Rock").matches(&doc));
        assert!(!Filter::eq("name", "Stone").matches(&doc));
        assert!(Filter::eq("items", "b").matches(&doc));
        assert!(!Filter::eq("items", "c").matches(&doc));
        assert!(Filter::eq("name", "Rock").and("items", "a").matches(&doc));
        assert!(Filter::eq("missing", Value::Null).matches(&doc));
        assert!(!Filter::eq("missing", 1).matches(&doc));
    }

    #[test]
    fn set_push_and_pull_edit_in_place() {
        let mut doc = json!({ "_id": "x", "title": "Old", "items": ["a", "b", "a"] });
        assert!(Update::set("title", "New").apply(&mut doc).is_ok());
        assert!(Update::pull("items", "a").apply(&mut doc).is_ok());
        assert!(Update::push("tags", "lit").apply(&mut doc).is_ok());
        assert_eq!(
            doc,
            json!({ "_id": "x", "title": "New", "items": ["b"], "tags": ["lit"] })
        );
    }

    #[test]
    fn updates_reject_identity_and_non_arrays() {
        let mut doc = json!({ "_id": "x", "title": "Old" });
        assert!(matches!(
            Update::set("_id", "y").apply(&mut doc),
            Err(DbError::InvalidUpdate { .. })
        ));
        assert!(Update::push("title", "z").apply(&mut doc).is_err());
        assert!(Update::pull("title", "z").apply(&mut doc).is_err());
        assert!(Update::pull("absent", "z").apply(&mut doc).is_ok());
    }

    #[test]
    fn cursor_deserializes_lazily() {
        let mut cursor = Cursor::new(vec![json!(1), json!("two"), json!(3)]);
        assert_eq!(cursor.remaining(), 3);
        assert_eq!(cursor.next_as::<u32>().and_then(Result::ok), Some(1));
        assert!(matches!(cursor.next_as::<u32>(), Some(Err(_))));
        assert_eq!(cursor.all::<u32>().ok(), Some(vec![3]));
    }

    #[test]
    fn stamp_id_overwrites_and_rejects_scalars() {
        let id = ObjectId::new();
        let stamped = stamp_id(Collection::Rooms, id, json!({ "_id": "stale" }));
        assert_eq!(
            stamped.ok().and_then(|o| o.get("_id").cloned()),
            Some(Value::String(id.to_string()))
        );
        assert!(stamp_id(Collection::Rooms, id, json!(5)).is_err());
    }
}
