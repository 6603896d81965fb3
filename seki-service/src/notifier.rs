use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use go_engine::{Captures, GameId, GameResult, GameScore, GameStatus, PlayerId, Pos};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::config::{Config, NotifierKind};

/// State changes pushed to whoever is watching a game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    GameUpdate {
        game_id: GameId,
        move_num: u32,
        status: GameStatus,
        changed: BTreeSet<Pos>,
        captures: Captures,
        at: DateTime<Utc>,
    },
    ScoringUpdate {
        game_id: GameId,
        changed: BTreeSet<Pos>,
        score: GameScore,
        black_done: bool,
        white_done: bool,
        at: DateTime<Utc>,
    },
    GameFinished {
        game_id: GameId,
        result: GameResult,
        summary: String,
        at: DateTime<Utc>,
    },
    UndoRequest {
        game_id: GameId,
        requester: PlayerId,
        recipient: Option<PlayerId>,
        move_num: u32,
        at: DateTime<Utc>,
    },
}

impl GameEvent {
    pub fn game_id(&self) -> GameId {
        match self {
            GameEvent::GameUpdate { game_id, .. }
            | GameEvent::ScoringUpdate { game_id, .. }
            | GameEvent::GameFinished { game_id, .. }
            | GameEvent::UndoRequest { game_id, .. } => *game_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::GameUpdate { .. } => "game_update",
            GameEvent::ScoringUpdate { .. } => "scoring_update",
            GameEvent::GameFinished { .. } => "game_finished",
            GameEvent::UndoRequest { .. } => "undo_request",
        }
    }
}

/// Delivery of game events. Best effort: a failed delivery never affects the game.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &GameEvent);
}

/// Fans events out to every subscriber of a broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<GameEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        BroadcastNotifier { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, event: &GameEvent) {
        // No subscribers is not an error; lagging ones see `RecvError::Lagged`.
        let _ = self.tx.send(event.clone());
    }
}

/// Writes every event to the log as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &GameEvent) {
        match serde_json::to_string(event) {
            Ok(json) => tracing::info!(game_id = event.game_id(), kind = event.kind(), "{json}"),
            Err(e) => tracing::warn!(game_id = event.game_id(), "failed to encode event: {e}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _event: &GameEvent) {}
}

/// The notifier `config` asks for. With the stdout notifier, the receiver is where the
/// caller picks events up; it holds at most `event_capacity` undelivered events.
pub fn build_notifier(
    config: &Config,
) -> (Arc<dyn Notifier>, Option<broadcast::Receiver<GameEvent>>) {
    match config.notifier {
        NotifierKind::Log => (Arc::new(LogNotifier), None),
        NotifierKind::None => (Arc::new(NoopNotifier), None),
        NotifierKind::Stdout => {
            let notifier = BroadcastNotifier::new(config.event_capacity);
            let rx = notifier.subscribe();
            (Arc::new(notifier), Some(rx))
        }
    }
}
