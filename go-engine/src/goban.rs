use std::collections::HashSet;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::Pos;
use crate::error::GoError;
use crate::ko;
use crate::stone::{Stone, Tile};

/// A connected group of same-colored stones and the empty points touching it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Group {
    pub stones: HashSet<Pos>,
    pub liberties: HashSet<Pos>,
}

impl Group {
    pub fn is_dead(&self) -> bool {
        self.liberties.is_empty()
    }
}

/// Outcome of a successful placement: the new board, what it captured, and the new ko point.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub goban: Goban,
    pub captured: Vec<Pos>,
    pub ko: Option<Pos>,
}

/// The Go board stored as a flat, row-major array of `size * size` tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goban {
    tiles: Vec<Tile>,
    size: u8,
}

impl Goban {
    /// Create an empty board.
    pub fn new(size: u8) -> Self {
        Goban {
            tiles: vec![Tile::Empty; size as usize * size as usize],
            size,
        }
    }

    /// Restore a board from its flat tile array.
    pub fn from_tiles(size: u8, tiles: Vec<Tile>) -> Result<Self, GoError> {
        if tiles.len() != size as usize * size as usize {
            return Err(GoError::CorruptHistory(format!(
                "{} tiles for a {size}x{size} board",
                tiles.len()
            )));
        }
        Ok(Goban { tiles, size })
    }

    // -- Accessors --

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.iter().all(|t| t.is_empty())
    }

    pub fn on_board(&self, pos: Pos) -> bool {
        pos < self.tiles.len()
    }

    pub fn tile(&self, pos: Pos) -> Option<Tile> {
        self.tiles.get(pos).copied()
    }

    pub fn stone_at(&self, pos: Pos) -> Option<Stone> {
        self.tile(pos).and_then(Tile::stone)
    }

    /// Positions holding a stone of the given color, ascending.
    pub fn stones(&self, stone: Stone) -> Vec<Pos> {
        let tile = stone.tile();
        (0..self.tiles.len())
            .filter(|&p| self.tiles[p] == tile)
            .collect()
    }

    pub(crate) fn set(&mut self, pos: Pos, tile: Tile) {
        if let Some(t) = self.tiles.get_mut(pos) {
            *t = tile;
        }
    }

    // -- Graph algorithms --

    /// The on-board orthogonal neighbors of `pos`. Row ends do not wrap.
    pub fn neighbors(&self, pos: Pos) -> ArrayVec<Pos, 4> {
        let size = self.size as usize;
        let mut result = ArrayVec::new();
        if !self.on_board(pos) {
            return result;
        }
        let (col, row) = (pos % size, pos / size);
        if col > 0 {
            result.push(pos - 1);
        }
        if col + 1 < size {
            result.push(pos + 1);
        }
        if row > 0 {
            result.push(pos - size);
        }
        if row + 1 < size {
            result.push(pos + size);
        }
        result
    }

    /// Flood-fill the group containing the stone at `pos`, collecting its liberties.
    pub fn find_group(&self, pos: Pos) -> Result<Group, GoError> {
        if !self.on_board(pos) {
            return Err(GoError::NotOnBoard(pos));
        }
        let tile = self.tiles[pos];
        if tile.is_empty() {
            return Err(GoError::InvalidPosition(pos));
        }

        let mut group = Group::default();
        let mut frontier = vec![pos];
        group.stones.insert(pos);

        while let Some(p) = frontier.pop() {
            for n in self.neighbors(p) {
                let nt = self.tiles[n];
                if nt == tile {
                    if group.stones.insert(n) {
                        frontier.push(n);
                    }
                } else if nt.is_empty() {
                    group.liberties.insert(n);
                }
            }
        }

        Ok(group)
    }

    // -- Game actions --

    /// Place `stone` at `pos`, resolving captures and rejecting suicide.
    ///
    /// `ko` is the point forbidden by the previous move. The receiver is left untouched;
    /// the resulting board is returned inside the [`Placement`].
    pub fn place(&self, pos: Pos, stone: Stone, ko: Option<Pos>) -> Result<Placement, GoError> {
        if !self.on_board(pos) {
            return Err(GoError::NotOnBoard(pos));
        }
        if !self.tiles[pos].is_empty() {
            return Err(GoError::Overwrite);
        }
        if ko == Some(pos) {
            return Err(GoError::KoViolation);
        }

        let mut goban = self.clone();
        goban.set(pos, stone.tile());

        let opponent = stone.opp().tile();
        let mut captured: HashSet<Pos> = HashSet::new();
        for n in self.neighbors(pos) {
            if goban.tiles[n] != opponent || captured.contains(&n) {
                continue;
            }
            let group = goban.find_group(n)?;
            if group.is_dead() {
                captured.extend(group.stones);
            }
        }

        if captured.is_empty() {
            if goban.find_group(pos)?.is_dead() {
                return Err(GoError::Suicide);
            }
        } else {
            for &p in &captured {
                goban.set(p, Tile::Empty);
            }
        }

        let mut captured: Vec<Pos> = captured.into_iter().collect();
        captured.sort_unstable();
        let ko = ko::detect_ko(&goban, pos, &captured)?;

        Ok(Placement {
            goban,
            captured,
            ko,
        })
    }

    /// Would `stone` be allowed at `pos`, given the current ko point?
    pub fn is_legal_move(&self, pos: Pos, stone: Stone, ko: Option<Pos>) -> bool {
        self.place(pos, stone, ko).is_ok()
    }
}

/// Analyzer entry point over a raw tile slice.
pub fn find_group(tiles: &[Tile], size: u8, pos: Pos) -> Result<Group, GoError> {
    Goban::from_tiles(size, tiles.to_vec())?.find_group(pos)
}
