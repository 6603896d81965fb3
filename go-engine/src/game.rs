use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::GoError;
use crate::snapshot::{BoardSnapshot, Captures};
use crate::status::{GameMode, GameStatus, TimeSettings};
use crate::stone::Stone;
use crate::territory::{self, GameResult, GameScore, ScoringRules};
use crate::undo;
use crate::view::changed_positions;
use crate::{GameId, PlayerId, Pos};

pub const MIN_BOARD_SIZE: u8 = 2;
pub const MAX_BOARD_SIZE: u8 = 25;
pub const MAX_DESCRIPTION_LEN: usize = 40;

/// Settings chosen when a game is created.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameOptions {
    pub description: String,
    pub mode: GameMode,
    pub time_settings: TimeSettings,
    pub handicap: bool,
    pub rules: ScoringRules,
}

/// Everything about a game except its snapshots, in the shape a caller persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub board_size: u8,
    pub status: GameStatus,
    pub creator: PlayerId,
    pub black: Option<PlayerId>,
    pub white: Option<PlayerId>,
    pub black_done: bool,
    pub white_done: bool,
    pub result: Option<GameResult>,
    #[serde(flatten)]
    pub options: GameOptions,
}

/// What an accepted mutation touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub move_num: u32,
    pub status: GameStatus,
    /// Points whose stone, marker or scoring annotation differs from before.
    pub changed: BTreeSet<Pos>,
}

/// A single game: its metadata, snapshot history and capture counters.
///
/// Every mutation checks its preconditions before touching anything, so a returned
/// error always means the game is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    record: GameRecord,
    snapshots: Vec<BoardSnapshot>,
    captures: Captures,
}

fn validate_board_size(size: u8) -> Result<(), GoError> {
    if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(GoError::BoardSize(size))
    }
}

fn validate_description(description: &str) -> Result<(), GoError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(GoError::DescriptionTooLong {
            max: MAX_DESCRIPTION_LEN,
        });
    }
    Ok(())
}

impl Game {
    /// An open game with default options, waiting for an opponent.
    pub fn new(id: GameId, board_size: u8, creator: PlayerId) -> Result<Self, GoError> {
        Self::with_options(id, board_size, creator, GameOptions::default())
    }

    pub fn with_options(
        id: GameId,
        board_size: u8,
        creator: PlayerId,
        options: GameOptions,
    ) -> Result<Self, GoError> {
        validate_board_size(board_size)?;
        validate_description(&options.description)?;

        let initial = BoardSnapshot::initial(board_size, options.handicap);
        Ok(Game {
            record: GameRecord {
                id,
                board_size,
                status: GameStatus::Open,
                creator,
                black: None,
                white: None,
                black_done: false,
                white_done: false,
                result: None,
                options,
            },
            snapshots: vec![initial],
            captures: Captures::new(),
        })
    }

    /// Rebuild a game from a persisted record and its snapshot chain.
    pub fn restore(record: GameRecord, snapshots: Vec<BoardSnapshot>) -> Result<Self, GoError> {
        validate_board_size(record.board_size)?;
        validate_description(&record.options.description)?;

        if snapshots.is_empty() {
            return Err(GoError::CorruptHistory("no snapshots".to_string()));
        }
        let len = record.board_size as usize * record.board_size as usize;
        for (i, snapshot) in snapshots.iter().enumerate() {
            if snapshot.move_num() as usize != i {
                return Err(GoError::CorruptHistory(format!(
                    "snapshot {i} has move_num {}",
                    snapshot.move_num()
                )));
            }
            if snapshot.goban().size() != record.board_size || snapshot.tiles().len() != len {
                return Err(GoError::CorruptHistory(format!(
                    "snapshot {i} does not fit a {0}x{0} board",
                    record.board_size
                )));
            }
            if let Some(marks) = snapshot.scoring()
                && (marks.territory.len() != len || marks.dead.len() != len)
            {
                return Err(GoError::CorruptHistory(format!(
                    "snapshot {i} has malformed scoring marks"
                )));
            }
        }
        if !record.status.is_open() && (record.black.is_none() || record.white.is_none()) {
            return Err(GoError::CorruptHistory(format!(
                "{} game without both seats filled",
                record.status
            )));
        }

        let captures = Captures::tally(&snapshots);
        Ok(Game {
            record,
            snapshots,
            captures,
        })
    }

    // -- Accessors --

    pub fn id(&self) -> GameId {
        self.record.id
    }

    pub fn size(&self) -> u8 {
        self.record.board_size
    }

    pub fn status(&self) -> GameStatus {
        self.record.status
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    pub fn options(&self) -> &GameOptions {
        &self.record.options
    }

    pub fn rules(&self) -> ScoringRules {
        self.record.options.rules
    }

    pub fn creator(&self) -> PlayerId {
        self.record.creator
    }

    pub fn snapshots(&self) -> &[BoardSnapshot] {
        &self.snapshots
    }

    /// The latest snapshot.
    pub fn active_board(&self) -> &BoardSnapshot {
        // Never empty: construction pushes move 0 and undo never removes it.
        &self.snapshots[self.snapshots.len() - 1]
    }

    fn active_board_mut(&mut self) -> &mut BoardSnapshot {
        let last = self.snapshots.len() - 1;
        &mut self.snapshots[last]
    }

    pub fn move_num(&self) -> u32 {
        self.active_board().move_num()
    }

    /// Color to move, by the parity of the latest move number.
    pub fn active_color(&self) -> Stone {
        Stone::to_move_after(self.move_num())
    }

    /// Player to move; `None` unless the game is being played.
    pub fn active_player(&self) -> Option<PlayerId> {
        if !self.status().is_active() {
            return None;
        }
        self.seat(self.active_color())
    }

    pub fn seat(&self, stone: Stone) -> Option<PlayerId> {
        match stone {
            Stone::Black => self.record.black,
            Stone::White => self.record.white,
        }
    }

    pub fn player_color(&self, player: PlayerId) -> Option<Stone> {
        if self.record.black == Some(player) {
            Some(Stone::Black)
        } else if self.record.white == Some(player) {
            Some(Stone::White)
        } else {
            None
        }
    }

    /// The other seated player, if `player` is seated and the game has been joined.
    pub fn opponent(&self, player: PlayerId) -> Option<PlayerId> {
        self.player_color(player)
            .and_then(|stone| self.seat(stone.opp()))
    }

    pub fn capture_count(&self, stone: Stone) -> u32 {
        self.captures.get(stone)
    }

    pub fn captures(&self) -> Captures {
        self.captures
    }

    pub fn done_scoring(&self, stone: Stone) -> bool {
        match stone {
            Stone::Black => self.record.black_done,
            Stone::White => self.record.white_done,
        }
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.record.result.as_ref()
    }

    /// Score of the active board under the current dead-stone marking.
    pub fn score(&self) -> GameScore {
        let board = self.active_board();
        let dead = board.dead_stones();
        let territory = territory::estimate_territory(board.goban(), &dead);
        territory::score(
            board.goban(),
            &territory,
            &dead,
            &self.captures,
            self.rules().komi,
        )
    }

    /// Empty points where the color to move may not play, because of suicide or ko.
    pub fn invalid_moves(&self) -> BTreeSet<Pos> {
        if !self.status().is_active() {
            return BTreeSet::new();
        }
        let board = self.active_board();
        let stone = self.active_color();
        (0..board.goban().len())
            .filter(|&p| board.tile(p).is_some_and(|t| t.is_empty()))
            .filter(|&p| !board.goban().is_legal_move(p, stone, board.ko()))
            .collect()
    }

    // -- Precondition helpers --

    fn require(&self, allowed: bool) -> Result<(), GoError> {
        if allowed {
            Ok(())
        } else {
            Err(GoError::WrongStatus(self.status()))
        }
    }

    fn seated(&self, player: PlayerId) -> Result<Stone, GoError> {
        self.player_color(player)
            .ok_or(GoError::NotSeated(player))
    }

    fn seated_to_move(&self, player: PlayerId) -> Result<Stone, GoError> {
        let stone = self.seated(player)?;
        if stone != self.active_color() {
            return Err(GoError::OutOfTurn);
        }
        Ok(stone)
    }

    fn change(&self, changed: BTreeSet<Pos>) -> Change {
        Change {
            move_num: self.move_num(),
            status: self.status(),
            changed,
        }
    }

    fn all_positions(&self) -> BTreeSet<Pos> {
        (0..self.active_board().goban().len()).collect()
    }

    // -- Mutations --

    /// Seat the creator as Black and `opponent` as White, starting play.
    pub fn join(&mut self, opponent: PlayerId) -> Result<Change, GoError> {
        self.require(self.status().is_open())?;
        if opponent == self.record.creator {
            return Err(GoError::OwnGame);
        }

        self.record.black = Some(self.record.creator);
        self.record.white = Some(opponent);
        self.record.status = GameStatus::Active;
        tracing::debug!(game_id = self.id(), opponent, "game joined");
        Ok(self.change(BTreeSet::new()))
    }

    /// Place a stone for `player` at `pos`.
    pub fn apply_move(&mut self, pos: Pos, player: PlayerId) -> Result<Change, GoError> {
        self.require(self.status().is_active())?;
        let stone = self.seated_to_move(player)?;

        let prev = self.active_board();
        let placement = prev.goban().place(pos, stone, prev.ko())?;
        let captured = placement.captured.len() as u32;
        let next = prev.after_move(pos, placement);
        let changed = changed_positions(prev, &next);

        self.captures.add(stone, captured);
        self.snapshots.push(next);
        tracing::debug!(
            game_id = self.id(),
            move_num = self.move_num(),
            pos,
            captured,
            "move played"
        );
        Ok(self.change(changed))
    }

    /// Pass for `player`. A second consecutive pass starts the scoring phase.
    pub fn pass(&mut self, player: PlayerId) -> Result<Change, GoError> {
        self.require(self.status().is_active())?;
        self.seated_to_move(player)?;

        let prev = self.active_board();
        let next = prev.after_pass();
        let mut changed = changed_positions(prev, &next);
        let second_pass = prev.is_pass();
        self.snapshots.push(next);

        if second_pass {
            self.enter_scoring();
            changed = self.all_positions();
        }
        tracing::debug!(
            game_id = self.id(),
            move_num = self.move_num(),
            status = %self.status(),
            "pass"
        );
        Ok(self.change(changed))
    }

    fn enter_scoring(&mut self) {
        self.record.status = GameStatus::EndGameScoring;
        self.record.black_done = false;
        self.record.white_done = false;
        let board = self.active_board_mut();
        let marks = territory::scoring_marks(board.goban(), &HashSet::new());
        board.set_scoring(marks);
    }

    /// Concede the game. `player` loses.
    pub fn resign(&mut self, player: PlayerId) -> Result<Change, GoError> {
        self.require(self.status().can_resign())?;
        let stone = self.seated(player)?;

        self.record.result = Some(GameResult::Resignation { winner: stone.opp() });
        self.record.status = GameStatus::Finished;
        tracing::debug!(game_id = self.id(), loser = %stone, "resigned");
        Ok(self.change(BTreeSet::new()))
    }

    /// Take back the requester's latest move, and the opponent's reply if there is one.
    pub fn undo(&mut self, player: PlayerId) -> Result<Change, GoError> {
        self.require(self.status().is_active())?;
        let stone = self.seated(player)?;

        let prev = self.active_board().clone();
        let depth = undo::retract(&mut self.snapshots, &mut self.captures, stone)?;
        let changed = changed_positions(&prev, self.active_board());
        tracing::debug!(
            game_id = self.id(),
            move_num = self.move_num(),
            depth,
            "undo"
        );
        Ok(self.change(changed))
    }

    /// Flip the dead marking of the whole group at `pos`.
    ///
    /// Both players' done flags are cleared, since the marking they agreed to is gone.
    pub fn mark_dead_stone(&mut self, pos: Pos, player: PlayerId) -> Result<Change, GoError> {
        self.require(self.status().is_scoring())?;
        self.seated(player)?;

        let prev = self.active_board();
        let mut dead = prev.dead_stones();
        territory::toggle_dead_group(prev.goban(), &mut dead, pos)?;
        let mut next = prev.clone();
        next.set_scoring(territory::scoring_marks(prev.goban(), &dead));
        let changed = changed_positions(prev, &next);

        *self.active_board_mut() = next;
        self.record.black_done = false;
        self.record.white_done = false;
        tracing::debug!(
            game_id = self.id(),
            pos,
            dead = dead.len(),
            "dead stones toggled"
        );
        Ok(self.change(changed))
    }

    /// Accept the current marking. Once both players have, the game is scored.
    pub fn signal_done_scoring(&mut self, player: PlayerId) -> Result<Change, GoError> {
        self.require(self.status().is_scoring())?;
        let stone = self.seated(player)?;

        match stone {
            Stone::Black => self.record.black_done = true,
            Stone::White => self.record.white_done = true,
        }
        if !(self.record.black_done && self.record.white_done) {
            tracing::debug!(game_id = self.id(), player = %stone, "done scoring");
            return Ok(self.change(BTreeSet::new()));
        }

        let changed = self.finalize();
        Ok(self.change(changed))
    }

    fn finalize(&mut self) -> BTreeSet<Pos> {
        let score = self.score();
        let winner = score.winner(self.rules().tie_break);
        let result = GameResult::Score { winner, score };

        let prev = self.active_board().clone();
        let board = self.active_board_mut();
        board.remove_dead_stones();
        let marks = territory::scoring_marks(board.goban(), &HashSet::new());
        board.set_scoring(marks);
        let changed = changed_positions(&prev, self.active_board());

        self.record.result = Some(result);
        self.record.status = GameStatus::Finished;
        tracing::debug!(game_id = self.id(), %result, "game scored");
        changed
    }
}
