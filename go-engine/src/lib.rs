pub mod error;
pub mod game;
pub mod goban;
pub mod ko;
pub mod snapshot;
pub mod status;
pub mod stone;
pub mod territory;
pub mod undo;
pub mod view;

/// Row-major index into the board: `row * size + col`.
pub type Pos = usize;
pub type PlayerId = i64;
pub type GameId = i64;

pub use error::{ErrorKind, GoError};
pub use game::{Change, Game, GameOptions, GameRecord};
pub use goban::{Goban, Group, find_group};
pub use snapshot::{BoardSnapshot, Captures, ScoringMarks};
pub use status::{GameMode, GameStatus, TimeSettings};
pub use stone::{Stone, Tile};
pub use territory::{GameResult, GameScore, PlayerPoints, ScoringRules, TieBreak};
pub use view::TileView;
