//! The eight compass directions a tile can have a neighbor in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the eight directions a neighboring tile can sit in, relative to
/// this tile. Corners (`UPLEFT`, `UPRIGHT`, `DOWNLEFT`, `DOWNRIGHT`) carry a
/// single-cell border; edges carry a full row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "UPRIGHT")]
    UpRight,
    #[serde(rename = "RIGHT")]
    Right,
    #[serde(rename = "DOWNRIGHT")]
    DownRight,
    #[serde(rename = "DOWN")]
    Down,
    #[serde(rename = "DOWNLEFT")]
    DownLeft,
    #[serde(rename = "LEFT")]
    Left,
    #[serde(rename = "UPLEFT")]
    UpLeft,
}

impl Direction {
    /// All eight directions, in no particular order other than stability.
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::UpRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
        Direction::UpLeft,
    ];

    /// The direction's wire-format tag, as used on `border_port` (spec §6).
    pub const fn tag(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::UpRight => "UPRIGHT",
            Direction::Right => "RIGHT",
            Direction::DownRight => "DOWNRIGHT",
            Direction::Down => "DOWN",
            Direction::DownLeft => "DOWNLEFT",
            Direction::Left => "LEFT",
            Direction::UpLeft => "UPLEFT",
        }
    }

    /// Parse a wire-format tag back into a `Direction`. Unknown tags are a
    /// contract violation, not a panic.
    pub fn from_tag(tag: &str) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.tag() == tag)
    }

    /// The direction's mirror image: `opposite(opposite(d)) == d`.
    ///
    /// Built from the four canonical pairs rather than written out twice,
    /// so the bijection can't drift out of sync with itself.
    pub fn opposite(self) -> Direction {
        const PAIRS: [(Direction, Direction); 4] = [
            (Direction::Up, Direction::Down),
            (Direction::UpRight, Direction::DownLeft),
            (Direction::Right, Direction::Left),
            (Direction::DownRight, Direction::UpLeft),
        ];
        for (a, b) in PAIRS {
            if self == a {
                return b;
            }
            if self == b {
                return a;
            }
        }
        unreachable!("every direction appears in PAIRS")
    }

    /// Whether this direction's border is a single corner cell rather than
    /// a full edge.
    pub const fn is_corner(self) -> bool {
        matches!(
            self,
            Direction::UpRight | Direction::DownRight | Direction::DownLeft | Direction::UpLeft
        )
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
