use std::collections::BTreeSet;

use serde::Serialize;

use crate::game::Game;
use crate::snapshot::BoardSnapshot;
use crate::stone::{Stone, Tile};
use crate::{PlayerId, Pos};

/// One point of the board as a particular viewer should see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileView {
    pub pos: Pos,
    pub tile: Tile,
    pub last_move: bool,
    pub ko: bool,
    pub invalid: bool,
    pub territory: Option<Stone>,
    pub dead: bool,
}

/// Points that render differently between two snapshots.
///
/// Covers stones placed or removed, scoring annotations, and the last-move and ko
/// markers when they moved.
pub fn changed_positions(prev: &BoardSnapshot, next: &BoardSnapshot) -> BTreeSet<Pos> {
    let mut changed: BTreeSet<Pos> = (0..next.tiles().len())
        .filter(|&p| {
            prev.tile(p) != next.tile(p)
                || prev.territory(p) != next.territory(p)
                || prev.is_dead(p) != next.is_dead(p)
        })
        .collect();

    if prev.pos() != next.pos() {
        changed.extend(prev.pos().into_iter().chain(next.pos()));
    }
    if prev.ko() != next.ko() {
        changed.extend(prev.ko().into_iter().chain(next.ko()));
    }
    changed
}

impl Game {
    /// The whole active board for `viewer`; `None` for a spectator.
    pub fn tiles_for(&self, viewer: Option<PlayerId>) -> Vec<TileView> {
        let all: BTreeSet<Pos> = (0..self.active_board().tiles().len()).collect();
        self.tiles_for_positions(viewer, &all)
    }

    /// Render only `positions`, skipping any that are off the board.
    ///
    /// Ko and invalid-move markers go to the player to move while the game is being
    /// played; territory and dead markers are shown from the scoring phase on.
    pub fn tiles_for_positions(
        &self,
        viewer: Option<PlayerId>,
        positions: &BTreeSet<Pos>,
    ) -> Vec<TileView> {
        let board = self.active_board();
        let status = self.status();
        let to_move = status.is_active()
            && viewer.is_some_and(|v| self.player_color(v) == Some(self.active_color()));
        let invalid = if to_move {
            self.invalid_moves()
        } else {
            BTreeSet::new()
        };
        let scoring = status.shows_scoring();

        positions
            .iter()
            .filter_map(|&pos| {
                let tile = board.tile(pos)?;
                Some(TileView {
                    pos,
                    tile,
                    last_move: board.pos() == Some(pos),
                    ko: to_move && board.ko() == Some(pos),
                    invalid: invalid.contains(&pos),
                    territory: if scoring { board.territory(pos) } else { None },
                    dead: scoring && board.is_dead(pos),
                })
            })
            .collect()
    }
}
