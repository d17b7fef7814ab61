//! Shared value types for the kmud world.
//!
//! Everything here is plain data: identifiers, the closed set of entity
//! kinds, exit directions and grid coordinates. The locking and persistence
//! machinery that wraps these lives in `kmud-db`.
//!
//! # Modules
//!
//! - [`ids`] -- [`ObjectId`], the identity every persisted entity carries.
//! - [`enums`] -- [`EntityKind`], [`ExitDirection`] and [`ColorMode`].
//! - [`coordinate`] -- [`Coordinate`] positions on a zone's room grid.

pub mod coordinate;
pub mod enums;
pub mod ids;

pub use coordinate::Coordinate;
pub use enums::{ColorMode, EntityKind, ExitDirection};
pub use ids::ObjectId;
