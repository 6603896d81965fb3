use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a game.
///
/// `Open → Active → EndGameScoring → Finished`. Resignation jumps straight to
/// `Finished` from either playing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Open,
    Active,
    EndGameScoring,
    Finished,
}

impl GameStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, GameStatus::Open)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, GameStatus::Active)
    }

    pub fn is_scoring(&self) -> bool {
        matches!(self, GameStatus::EndGameScoring)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, GameStatus::Finished)
    }

    /// Territory and dead-stone markers are shown from the scoring phase on.
    pub fn shows_scoring(&self) -> bool {
        matches!(self, GameStatus::EndGameScoring | GameStatus::Finished)
    }

    pub fn can_resign(&self) -> bool {
        matches!(self, GameStatus::Active | GameStatus::EndGameScoring)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Open => write!(f, "open"),
            GameStatus::Active => write!(f, "active"),
            GameStatus::EndGameScoring => write!(f, "end_game_scoring"),
            GameStatus::Finished => write!(f, "finished"),
        }
    }
}

impl std::str::FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(GameStatus::Open),
            "active" => Ok(GameStatus::Active),
            "end_game_scoring" => Ok(GameStatus::EndGameScoring),
            "finished" => Ok(GameStatus::Finished),
            _ => Err(format!("unknown status: {s}")),
        }
    }
}

/// Whether the game counts towards ratings. Stored only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Ranked,
    #[default]
    NotRanked,
}

/// Per-move time budget. Enforcement lives outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TimeSettings {
    #[default]
    None,
    PerMove { seconds: u32 },
}
