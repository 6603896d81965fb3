use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::Pos;
use crate::goban::{Goban, Placement};
use crate::stone::{Stone, Tile};

/// Stones captured by each color's own moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Captures {
    pub black: u32,
    pub white: u32,
}

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum `captured_stones` over the snapshots, crediting each to the color that moved.
    pub fn tally(snapshots: &[BoardSnapshot]) -> Self {
        let mut captures = Captures::new();
        for snapshot in snapshots {
            if let Some(stone) = snapshot.mover() {
                captures.add(stone, snapshot.captured_stones());
            }
        }
        captures
    }

    pub fn get(&self, stone: Stone) -> u32 {
        match stone {
            Stone::Black => self.black,
            Stone::White => self.white,
        }
    }

    pub(crate) fn add(&mut self, stone: Stone, count: u32) {
        match stone {
            Stone::Black => self.black += count,
            Stone::White => self.white += count,
        }
    }

    /// `None` if the counter for `stone` holds fewer than `count`.
    pub(crate) fn checked_sub(&self, stone: Stone, count: u32) -> Option<Self> {
        let mut captures = *self;
        match stone {
            Stone::Black => captures.black = self.black.checked_sub(count)?,
            Stone::White => captures.white = self.white.checked_sub(count)?,
        }
        Some(captures)
    }
}

/// Territory owner and dead-stone flag for every point, filled in once scoring begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringMarks {
    pub territory: Vec<Option<Stone>>,
    pub dead: Vec<bool>,
}

impl ScoringMarks {
    pub fn new(len: usize) -> Self {
        ScoringMarks {
            territory: vec![None; len],
            dead: vec![false; len],
        }
    }

    pub fn dead_stones(&self) -> HashSet<Pos> {
        self.dead
            .iter()
            .enumerate()
            .filter_map(|(p, &d)| d.then_some(p))
            .collect()
    }
}

/// The full board after one move or pass.
///
/// Everything but the scoring marks is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    move_num: u32,
    #[serde(flatten)]
    goban: Goban,
    pos: Option<Pos>,
    pass: bool,
    ko: Option<Pos>,
    captured_stones: u32,
    scoring: Option<ScoringMarks>,
}

impl BoardSnapshot {
    /// The empty starting board, move 0.
    ///
    /// Handicap stones would be pre-placed here; placement is not implemented yet, so a
    /// handicap game starts from an empty board like any other.
    pub fn initial(size: u8, handicap: bool) -> Self {
        if handicap {
            tracing::warn!(size, "handicap placement is not implemented; starting empty");
        }
        BoardSnapshot {
            move_num: 0,
            goban: Goban::new(size),
            pos: None,
            pass: false,
            ko: None,
            captured_stones: 0,
            scoring: None,
        }
    }

    /// Rebuild a snapshot from persisted parts. Chain consistency is checked by the game.
    pub fn from_parts(
        move_num: u32,
        goban: Goban,
        pos: Option<Pos>,
        pass: bool,
        ko: Option<Pos>,
        captured_stones: u32,
    ) -> Self {
        BoardSnapshot {
            move_num,
            goban,
            pos,
            pass,
            ko,
            captured_stones,
            scoring: None,
        }
    }

    pub(crate) fn after_move(&self, pos: Pos, placement: Placement) -> Self {
        BoardSnapshot {
            move_num: self.move_num + 1,
            goban: placement.goban,
            pos: Some(pos),
            pass: false,
            ko: placement.ko,
            captured_stones: placement.captured.len() as u32,
            scoring: None,
        }
    }

    pub(crate) fn after_pass(&self) -> Self {
        BoardSnapshot {
            move_num: self.move_num + 1,
            goban: self.goban.clone(),
            pos: None,
            pass: true,
            ko: None,
            captured_stones: 0,
            scoring: None,
        }
    }

    // -- Accessors --

    pub fn move_num(&self) -> u32 {
        self.move_num
    }

    pub fn goban(&self) -> &Goban {
        &self.goban
    }

    pub fn tiles(&self) -> &[Tile] {
        self.goban.tiles()
    }

    pub fn tile(&self, pos: Pos) -> Option<Tile> {
        self.goban.tile(pos)
    }

    /// Last-played position; `None` for passes and the initial board.
    pub fn pos(&self) -> Option<Pos> {
        self.pos
    }

    pub fn is_pass(&self) -> bool {
        self.pass
    }

    pub fn ko(&self) -> Option<Pos> {
        self.ko
    }

    pub fn captured_stones(&self) -> u32 {
        self.captured_stones
    }

    /// Color that produced this snapshot; `None` for the initial board.
    pub fn mover(&self) -> Option<Stone> {
        (self.move_num > 0).then(|| Stone::moved_at(self.move_num))
    }

    pub fn scoring(&self) -> Option<&ScoringMarks> {
        self.scoring.as_ref()
    }

    pub fn territory(&self, pos: Pos) -> Option<Stone> {
        self.scoring
            .as_ref()
            .and_then(|s| s.territory.get(pos).copied().flatten())
    }

    pub fn is_dead(&self, pos: Pos) -> bool {
        self.scoring
            .as_ref()
            .is_some_and(|s| s.dead.get(pos).copied().unwrap_or(false))
    }

    pub fn dead_stones(&self) -> HashSet<Pos> {
        self.scoring
            .as_ref()
            .map(ScoringMarks::dead_stones)
            .unwrap_or_default()
    }

    // -- Scoring phase mutation --

    pub(crate) fn set_scoring(&mut self, marks: ScoringMarks) {
        self.scoring = Some(marks);
    }

    /// Take the marked dead stones off the board, keeping their points as territory.
    pub(crate) fn remove_dead_stones(&mut self) {
        let Some(marks) = self.scoring.as_mut() else {
            return;
        };
        for (pos, dead) in marks.dead.iter_mut().enumerate() {
            if *dead {
                self.goban.set(pos, Tile::Empty);
                *dead = false;
            }
        }
    }
}
