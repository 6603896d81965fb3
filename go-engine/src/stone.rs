use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;
use std::ops::Neg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Stone {
    Black = 1,
    White = 2,
}

impl Stone {
    /// The color that moves after `move_num` moves have been played.
    pub fn to_move_after(move_num: u32) -> Self {
        if move_num.is_multiple_of(2) {
            Stone::Black
        } else {
            Stone::White
        }
    }

    /// The color that produced the snapshot numbered `move_num` (must be ≥ 1).
    pub fn moved_at(move_num: u32) -> Self {
        Self::to_move_after(move_num.saturating_sub(1))
    }

    pub fn opp(self) -> Self {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Stone::Black => "B",
            Stone::White => "W",
        }
    }

    pub fn tile(self) -> Tile {
        match self {
            Stone::Black => Tile::Black,
            Stone::White => Tile::White,
        }
    }
}

impl Neg for Stone {
    type Output = Self;

    fn neg(self) -> Self {
        self.opp()
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stone::Black => write!(f, "Black"),
            Stone::White => write!(f, "White"),
        }
    }
}

/// State of a single intersection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum Tile {
    #[default]
    Empty = 0,
    Black = 1,
    White = 2,
}

impl Tile {
    pub fn stone(self) -> Option<Stone> {
        match self {
            Tile::Empty => None,
            Tile::Black => Some(Stone::Black),
            Tile::White => Some(Stone::White),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Tile::Empty
    }
}

impl From<Stone> for Tile {
    fn from(stone: Stone) -> Self {
        stone.tile()
    }
}
