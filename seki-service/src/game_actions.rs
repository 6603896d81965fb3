use chrono::{DateTime, Utc};
use go_engine::undo::undo_depth;
use go_engine::{
    Captures, Change, Game, GameId, GameMode, GameOptions, GameStatus, GoError, PlayerId, Pos,
    TileView, TimeSettings,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ServiceError;
use crate::notifier::GameEvent;
use crate::registry::{GameRoom, UndoRequest};

// -- Request / return types --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewGame {
    /// Falls back to the configured default size.
    pub board_size: Option<u8>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mode: GameMode,
    #[serde(default)]
    pub time_settings: TimeSettings,
    #[serde(default)]
    pub handicap: bool,
}

/// Everything a client needs to draw a game for one viewer.
#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    pub game_id: GameId,
    pub status: GameStatus,
    pub move_num: u32,
    pub black: Option<PlayerId>,
    pub white: Option<PlayerId>,
    pub active_player: Option<PlayerId>,
    pub captures: Captures,
    pub undo_request: Option<UndoRequest>,
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub tiles: Vec<TileView>,
}

// -- Core game actions --
// Each action mutates the game under its room lock, then notifies once the lock is gone.

pub async fn create_game(
    state: &AppState,
    creator: PlayerId,
    new_game: NewGame,
) -> Result<GameId, ServiceError> {
    let board_size = new_game
        .board_size
        .unwrap_or(state.config.default_board_size);
    let options = GameOptions {
        description: new_game.description,
        mode: new_game.mode,
        time_settings: new_game.time_settings,
        handicap: new_game.handicap,
        rules: state.config.rules,
    };

    let game_id = state
        .registry
        .create_game(board_size, creator, options)
        .await?;
    tracing::debug!(game_id, creator, board_size, "game created");
    Ok(game_id)
}

pub async fn join_game(
    state: &AppState,
    game_id: GameId,
    player_id: PlayerId,
) -> Result<Change, ServiceError> {
    apply_game_mutation(state, game_id, |room| room.game.join(player_id)).await
}

pub async fn play_move(
    state: &AppState,
    game_id: GameId,
    player_id: PlayerId,
    pos: Pos,
) -> Result<Change, ServiceError> {
    apply_game_mutation(state, game_id, |room| {
        let change = room.game.apply_move(pos, player_id)?;
        room.undo_request = None;
        Ok(change)
    })
    .await
}

pub async fn pass(
    state: &AppState,
    game_id: GameId,
    player_id: PlayerId,
) -> Result<Change, ServiceError> {
    apply_game_mutation(state, game_id, |room| {
        let change = room.game.pass(player_id)?;
        room.undo_request = None;
        Ok(change)
    })
    .await
}

pub async fn resign(
    state: &AppState,
    game_id: GameId,
    player_id: PlayerId,
) -> Result<Change, ServiceError> {
    apply_game_mutation(state, game_id, |room| {
        let change = room.game.resign(player_id)?;
        room.undo_request = None;
        Ok(change)
    })
    .await
}

pub async fn mark_dead_stone(
    state: &AppState,
    game_id: GameId,
    player_id: PlayerId,
    pos: Pos,
) -> Result<Change, ServiceError> {
    apply_game_mutation(state, game_id, |room| {
        room.game.mark_dead_stone(pos, player_id)
    })
    .await
}

pub async fn done_scoring(
    state: &AppState,
    game_id: GameId,
    player_id: PlayerId,
) -> Result<Change, ServiceError> {
    apply_game_mutation(state, game_id, |room| {
        room.game.signal_done_scoring(player_id)
    })
    .await
}

/// Undo without asking the opponent, for callers that settle agreement themselves.
///
/// Any pending request is dropped once the undo goes through.
pub async fn undo(
    state: &AppState,
    game_id: GameId,
    player_id: PlayerId,
) -> Result<Change, ServiceError> {
    apply_game_mutation(state, game_id, |room| {
        let change = room.game.undo(player_id)?;
        room.undo_request = None;
        Ok(change)
    })
    .await
}

// -- Undo handshake --

/// Ask the opponent to allow an undo. The request is answered with `respond_to_undo`.
pub async fn request_undo(
    state: &AppState,
    game_id: GameId,
    player_id: PlayerId,
) -> Result<UndoRequest, ServiceError> {
    let (request, event) = state
        .registry
        .with_room(game_id, |room| {
            let game = &room.game;
            if !game.status().is_active() {
                return Err(GoError::WrongStatus(game.status()).into());
            }
            let stone = game
                .player_color(player_id)
                .ok_or(GoError::NotSeated(player_id))?;
            if room.undo_request.is_some() {
                return Err(ServiceError::BadRequest(
                    "an undo request is already pending".to_string(),
                ));
            }
            undo_depth(game.move_num(), stone)?;

            let request = UndoRequest {
                requester: player_id,
                move_num: game.move_num(),
            };
            let event = GameEvent::UndoRequest {
                game_id,
                requester: player_id,
                recipient: game.opponent(player_id),
                move_num: request.move_num,
                at: Utc::now(),
            };
            room.undo_request = Some(request);
            Ok((request, event))
        })
        .await?;

    tracing::debug!(game_id, player_id, move_num = request.move_num, "undo requested");
    state.notifier.notify(&event);
    Ok(request)
}

/// Answer a pending undo request.
///
/// `token` is the move number the responder saw; an acceptance for any other move is
/// refused as stale and the request stays pending. A refusal or a successful undo
/// clears it. Returns the change when the undo went through.
pub async fn respond_to_undo(
    state: &AppState,
    game_id: GameId,
    responder: PlayerId,
    accept: bool,
    token: u32,
) -> Result<Option<Change>, ServiceError> {
    let outcome = state
        .registry
        .with_room(game_id, |room| {
            let request = room.undo_request.ok_or_else(|| {
                ServiceError::BadRequest("no undo request is pending".to_string())
            })?;
            room.game
                .player_color(responder)
                .ok_or(GoError::NotSeated(responder))?;
            if responder == request.requester {
                return Err(ServiceError::BadRequest(
                    "cannot answer your own undo request".to_string(),
                ));
            }
            if !accept {
                room.undo_request = None;
                return Ok(None);
            }
            // A stale acceptance leaves the request pending for a fresh answer.
            if token != request.move_num || token != room.game.move_num() {
                return Err(ServiceError::BadRequest(format!(
                    "undo request for move {token} is stale"
                )));
            }
            let change = room.game.undo(request.requester)?;
            room.undo_request = None;
            let events = events_for(&room.game, &change);
            Ok(Some((change, events)))
        })
        .await?;

    let Some((change, events)) = outcome else {
        tracing::debug!(game_id, responder, "undo rejected");
        return Ok(None);
    };
    tracing::debug!(game_id, responder, move_num = change.move_num, "undo accepted");
    notify_all(state, &events);
    Ok(Some(change))
}

// -- Reads --

pub async fn game_view(
    state: &AppState,
    game_id: GameId,
    viewer: Option<PlayerId>,
) -> Result<GameView, ServiceError> {
    state
        .registry
        .with_room(game_id, |room| Ok(build_view(room, viewer)))
        .await
}

fn build_view(room: &GameRoom, viewer: Option<PlayerId>) -> GameView {
    let game = &room.game;
    GameView {
        game_id: game.id(),
        status: game.status(),
        move_num: game.move_num(),
        black: game.seat(go_engine::Stone::Black),
        white: game.seat(go_engine::Stone::White),
        active_player: game.active_player(),
        captures: game.captures(),
        undo_request: room.undo_request,
        result: game.result().map(ToString::to_string),
        created_at: room.created_at,
        tiles: game.tiles_for(viewer),
    }
}

// -- Helpers --

/// Run a game mutation under the room lock, then announce the change.
///
/// If the closure fails the game is left as it was and nothing is sent.
async fn apply_game_mutation<F>(
    state: &AppState,
    game_id: GameId,
    f: F,
) -> Result<Change, ServiceError>
where
    F: FnOnce(&mut GameRoom) -> Result<Change, GoError>,
{
    let (change, events) = state
        .registry
        .with_room(game_id, |room| {
            let change = f(room)?;
            let events = events_for(&room.game, &change);
            Ok((change, events))
        })
        .await?;

    notify_all(state, &events);
    Ok(change)
}

fn notify_all(state: &AppState, events: &[GameEvent]) {
    for event in events {
        state.notifier.notify(event);
    }
}

/// Events describing `change`, by the phase the game is now in.
fn events_for(game: &Game, change: &Change) -> Vec<GameEvent> {
    let game_id = game.id();
    let at = Utc::now();
    let update = || GameEvent::GameUpdate {
        game_id,
        move_num: change.move_num,
        status: change.status,
        changed: change.changed.clone(),
        captures: game.captures(),
        at,
    };

    match change.status {
        GameStatus::Open => Vec::new(),
        GameStatus::Active => vec![update()],
        GameStatus::EndGameScoring => vec![GameEvent::ScoringUpdate {
            game_id,
            changed: change.changed.clone(),
            score: game.score(),
            black_done: game.done_scoring(go_engine::Stone::Black),
            white_done: game.done_scoring(go_engine::Stone::White),
            at,
        }],
        GameStatus::Finished => {
            let mut events = Vec::new();
            if !change.changed.is_empty() {
                events.push(update());
            }
            if let Some(result) = game.result() {
                events.push(GameEvent::GameFinished {
                    game_id,
                    result: *result,
                    summary: result.to_string(),
                    at,
                });
            }
            events
        }
    }
}
