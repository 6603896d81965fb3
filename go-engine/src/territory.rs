use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Pos;
use crate::error::GoError;
use crate::goban::Goban;
use crate::snapshot::{Captures, ScoringMarks};
use crate::stone::{Stone, Tile};

/// Attribute every empty region to the single color bordering it, if there is one.
///
/// Dead stones are treated as removed. Returns one entry per point: the territory owner,
/// or `None` for stones, dame, and regions touching no stones at all.
pub fn estimate_territory(goban: &Goban, dead_stones: &HashSet<Pos>) -> Vec<Option<Stone>> {
    let len = goban.len();

    // Virtual board with dead stones removed
    let mut virtual_board = goban.tiles().to_vec();
    for &p in dead_stones {
        if p < len {
            virtual_board[p] = Tile::Empty;
        }
    }

    let mut ownership = vec![None; len];
    let mut visited = vec![false; len];

    for start in 0..len {
        if visited[start] || !virtual_board[start].is_empty() {
            continue;
        }

        // Flood-fill this empty region
        let mut region = Vec::new();
        let mut border_colors: u8 = 0; // bit 0 = Black seen, bit 1 = White seen
        let mut stack = vec![start];
        visited[start] = true;

        while let Some(p) = stack.pop() {
            region.push(p);
            for n in goban.neighbors(p) {
                match virtual_board[n] {
                    Tile::Black => border_colors |= 1,
                    Tile::White => border_colors |= 2,
                    Tile::Empty if !visited[n] => {
                        visited[n] = true;
                        stack.push(n);
                    }
                    Tile::Empty => {}
                }
            }
        }

        let owner = match border_colors {
            1 => Some(Stone::Black),
            2 => Some(Stone::White),
            _ => None,
        };

        for p in region {
            ownership[p] = owner;
        }
    }

    ownership
}

/// Toggle all stones in the group at `pos` as dead/alive.
///
/// If any stone in the group is currently dead the whole group comes back to life,
/// otherwise the whole group is marked dead.
pub fn toggle_dead_group(
    goban: &Goban,
    dead_stones: &mut HashSet<Pos>,
    pos: Pos,
) -> Result<(), GoError> {
    let group = goban.find_group(pos)?;
    let any_dead = group.stones.iter().any(|p| dead_stones.contains(p));

    if any_dead {
        for p in &group.stones {
            dead_stones.remove(p);
        }
    } else {
        dead_stones.extend(group.stones);
    }
    Ok(())
}

/// Build the per-point scoring annotations for a board and a set of dead stones.
pub fn scoring_marks(goban: &Goban, dead_stones: &HashSet<Pos>) -> ScoringMarks {
    let mut marks = ScoringMarks::new(goban.len());
    marks.territory = estimate_territory(goban, dead_stones);
    for &p in dead_stones {
        if goban.stone_at(p).is_some() {
            marks.dead[p] = true;
        }
    }
    marks
}

/// Who wins when both totals are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    #[default]
    Draw,
    Black,
    White,
}

impl std::str::FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draw" => Ok(TieBreak::Draw),
            "black" => Ok(TieBreak::Black),
            "white" => Ok(TieBreak::White),
            _ => Err(format!("unknown tie break: {s}")),
        }
    }
}

/// Score adjustments supplied by whoever configures the game.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Points credited to White.
    pub komi: f64,
    pub tie_break: TieBreak,
}

/// Per-color score breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerPoints {
    pub stones: u32,
    pub territory: u32,
    pub captures: u32,
}

impl PlayerPoints {
    pub fn total(&self) -> u32 {
        self.stones + self.territory + self.captures
    }
}

/// Full score breakdown for both players.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameScore {
    pub black: PlayerPoints,
    pub white: PlayerPoints,
    pub komi: f64,
}

impl GameScore {
    pub fn black_total(&self) -> f64 {
        self.black.total() as f64
    }

    pub fn white_total(&self) -> f64 {
        self.white.total() as f64 + self.komi
    }

    /// Higher total wins; equal totals go to the tie-break.
    pub fn winner(&self, tie_break: TieBreak) -> Option<Stone> {
        let diff = self.black_total() - self.white_total();
        if diff > 0.0 {
            Some(Stone::Black)
        } else if diff < 0.0 {
            Some(Stone::White)
        } else {
            match tie_break {
                TieBreak::Draw => None,
                TieBreak::Black => Some(Stone::Black),
                TieBreak::White => Some(Stone::White),
            }
        }
    }
}

/// Calculate final scores.
///
/// score = live stones + territory + captures by own moves, plus komi for White.
pub fn score(
    goban: &Goban,
    territory: &[Option<Stone>],
    dead_stones: &HashSet<Pos>,
    captures: &Captures,
    komi: f64,
) -> GameScore {
    let mut points = [PlayerPoints::default(), PlayerPoints::default()];
    let slot = |stone: Stone| match stone {
        Stone::Black => 0,
        Stone::White => 1,
    };

    for owner in territory.iter().flatten() {
        points[slot(*owner)].territory += 1;
    }

    for (p, tile) in goban.tiles().iter().enumerate() {
        if let Some(stone) = tile.stone()
            && !dead_stones.contains(&p)
        {
            points[slot(stone)].stones += 1;
        }
    }

    points[0].captures = captures.get(Stone::Black);
    points[1].captures = captures.get(Stone::White);

    GameScore {
        black: points[0],
        white: points[1],
        komi,
    }
}

/// How a finished game was decided.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GameResult {
    Resignation { winner: Stone },
    Score { winner: Option<Stone>, score: GameScore },
}

impl GameResult {
    pub fn winner(&self) -> Option<Stone> {
        match self {
            GameResult::Resignation { winner } => Some(*winner),
            GameResult::Score { winner, .. } => *winner,
        }
    }

    pub fn loser(&self) -> Option<Stone> {
        self.winner().map(Stone::opp)
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Resignation { winner } => write!(f, "{}+R", winner.letter()),
            GameResult::Score { winner, score } => {
                let diff = (score.black_total() - score.white_total()).abs();
                match winner {
                    Some(stone) => write!(f, "{}+{}", stone.letter(), diff),
                    None => write!(f, "Draw"),
                }
            }
        }
    }
}
