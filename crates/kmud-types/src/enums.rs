//! Enumeration types shared across the kmud crates.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Entity kinds
// ---------------------------------------------------------------------------

/// The closed set of persisted entity kinds.
///
/// Fixed when an entity is constructed and used only to decide which
/// collection of the document store holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A player character.
    Character,
    /// A login account owning characters.
    User,
    /// A named group of rooms.
    Zone,
    /// A named region inside a zone.
    Area,
    /// A single room on a zone's grid.
    Room,
    /// An object that can lie in a room or be carried.
    Item,
}

impl EntityKind {
    /// Every entity kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Character,
        Self::User,
        Self::Zone,
        Self::Area,
        Self::Room,
        Self::Item,
    ];

    /// Lowercase label used in log output.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::User => "user",
            Self::Zone => "zone",
            Self::Area => "area",
            Self::Room => "room",
            Self::Item => "item",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Exit directions
// ---------------------------------------------------------------------------

/// A direction a room exit can lead in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitDirection {
    /// Towards decreasing `y`.
    North,
    /// North and east at once.
    NorthEast,
    /// Towards increasing `x`.
    East,
    /// South and east at once.
    SouthEast,
    /// Towards increasing `y`.
    South,
    /// South and west at once.
    SouthWest,
    /// Towards decreasing `x`.
    West,
    /// North and west at once.
    NorthWest,
    /// Towards increasing `z`.
    Up,
    /// Towards decreasing `z`.
    Down,
}

impl ExitDirection {
    /// Every direction, in the order exits are listed to players.
    pub const ALL: [Self; 10] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
        Self::Up,
        Self::Down,
    ];

    /// Short command form (`n`, `ne`, `u`, ...).
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::North => "n",
            Self::NorthEast => "ne",
            Self::East => "e",
            Self::SouthEast => "se",
            Self::South => "s",
            Self::SouthWest => "sw",
            Self::West => "w",
            Self::NorthWest => "nw",
            Self::Up => "u",
            Self::Down => "d",
        }
    }

    /// Full lowercase name (`north`, `northeast`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::NorthEast => "northeast",
            Self::East => "east",
            Self::SouthEast => "southeast",
            Self::South => "south",
            Self::SouthWest => "southwest",
            Self::West => "west",
            Self::NorthWest => "northwest",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Parse either the abbreviation or the full name, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|dir| dir.abbreviation() == input || dir.name() == input)
    }

    /// The direction leading back.
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

impl core::fmt::Display for ExitDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Color mode
// ---------------------------------------------------------------------------

/// Terminal color preference of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Plain text.
    #[default]
    None,
    /// Palette for light terminal backgrounds.
    Light,
    /// Palette for dark terminal backgrounds.
    Dark,
}
