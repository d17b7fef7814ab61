//! Room grid positions.

use serde::{Deserialize, Serialize};

use crate::enums::ExitDirection;

/// Position of a room on its zone's three-dimensional grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// West (negative) to east (positive).
    pub x: i32,
    /// North (negative) to south (positive).
    pub y: i32,
    /// Down (negative) to up (positive).
    pub z: i32,
}

impl Coordinate {
    /// Construct a coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The neighbouring coordinate one step in `direction`.
    ///
    /// Saturates at the edges of the `i32` range.
    #[must_use]
    pub const fn next(self, direction: ExitDirection) -> Self {
        let (dx, dy, dz) = match direction {
            ExitDirection::North => (0, -1, 0),
            ExitDirection::NorthEast => (1, -1, 0),
            ExitDirection::East => (1, 0, 0),
            ExitDirection::SouthEast => (1, 1, 0),
            ExitDirection::South => (0, 1, 0),
            ExitDirection::SouthWest => (-1, 1, 0),
            ExitDirection::West => (-1, 0, 0),
            ExitDirection::NorthWest => (-1, -1, 0),
            ExitDirection::Up => (0, 0, 1),
            ExitDirection::Down => (0, 0, -1),
        };
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping_there_and_back_returns_home() {
        let origin = Coordinate::default();
        for dir in ExitDirection::ALL {
            assert_eq!(origin.next(dir).next(dir.opposite()), origin);
        }
    }

    #[test]
    fn next_saturates_at_the_edge() {
        let edge = Coordinate::new(i32::MAX, 0, i32::MIN);
        assert_eq!(edge.next(ExitDirection::East).x, i32::MAX);
        assert_eq!(edge.next(ExitDirection::Down).z, i32::MIN);
    }
}
