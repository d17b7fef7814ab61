//! Error types for the `kmud-world` crate.

use kmud_db::DbError;
use kmud_types::{EntityKind, ObjectId};

/// Errors raised by world registry operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The store rejected a synchronous read or delete.
    #[error("store error: {0}")]
    Db(#[from] DbError),

    /// No live object of this kind carries the id.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind that was looked up.
        kind: EntityKind,
        /// Missing id.
        id: ObjectId,
    },

    /// A user with this name already exists.
    #[error("user name already taken: {0}")]
    NameTaken(String),
}
