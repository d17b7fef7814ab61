//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`fred`] and [`serde_json`] errors with additional context about which
//! operation failed.

use kmud_types::ObjectId;

use crate::collection::Collection;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No document with the given id exists in the collection.
    #[error("document {id} not found in {collection}")]
    NotFound {
        /// The collection that was searched.
        collection: Collection,
        /// The missing id.
        id: ObjectId,
    },

    /// A stored value is not a JSON object keyed by `_id`.
    #[error("malformed document in {collection}: {reason}")]
    MalformedDocument {
        /// The collection holding the document.
        collection: Collection,
        /// What was wrong with it.
        reason: String,
    },

    /// A partial update could not be applied to a document.
    #[error("invalid update on field `{field}`: {reason}")]
    InvalidUpdate {
        /// The field the update targeted.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
