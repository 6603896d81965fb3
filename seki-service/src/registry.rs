use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use go_engine::{Game, GameId, GameOptions, PlayerId};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::error::ServiceError;

/// An undo waiting for the opponent's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UndoRequest {
    pub requester: PlayerId,
    /// Move number when the request was made; an answer for any other move is stale.
    pub move_num: u32,
}

#[derive(Debug)]
pub struct GameRoom {
    pub game: Game,
    /// Transient: lost when the process exits, which is fine
    pub undo_request: Option<UndoRequest>,
    pub created_at: DateTime<Utc>,
}

impl GameRoom {
    fn new(game: Game) -> Self {
        GameRoom {
            game,
            undo_request: None,
            created_at: Utc::now(),
        }
    }
}

/// In-memory games, each behind its own lock.
///
/// The map lock is only held to find or insert a room; game mutations run under the
/// room's mutex, so games never wait on each other.
#[derive(Debug, Clone)]
pub struct GameRegistry {
    rooms: Arc<RwLock<HashMap<GameId, Arc<Mutex<GameRoom>>>>>,
    next_id: Arc<AtomicI64>,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRegistry {
    pub fn new() -> Self {
        GameRegistry {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Create an open game under a fresh id.
    pub async fn create_game(
        &self,
        board_size: u8,
        creator: PlayerId,
        options: GameOptions,
    ) -> Result<GameId, ServiceError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let game = Game::with_options(id, board_size, creator, options)?;

        let mut rooms = self.rooms.write().await;
        rooms.insert(id, Arc::new(Mutex::new(GameRoom::new(game))));
        Ok(id)
    }

    /// Register a game rebuilt elsewhere, e.g. with `Game::restore`.
    pub async fn insert(&self, game: Game) -> Result<(), ServiceError> {
        let id = game.id();
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&id) {
            return Err(ServiceError::BadRequest(format!("game {id} already exists")));
        }
        let next = id
            .checked_add(1)
            .ok_or_else(|| ServiceError::BadRequest(format!("game id {id} is out of range")))?;
        self.next_id.fetch_max(next, Ordering::Relaxed);
        rooms.insert(id, Arc::new(Mutex::new(GameRoom::new(game))));
        Ok(())
    }

    pub async fn get(&self, game_id: GameId) -> Result<Arc<Mutex<GameRoom>>, ServiceError> {
        let rooms = self.rooms.read().await;
        rooms
            .get(&game_id)
            .cloned()
            .ok_or(ServiceError::NotFound(game_id))
    }

    /// A copy of the game as it stands.
    pub async fn game(&self, game_id: GameId) -> Result<Game, ServiceError> {
        let room = self.get(game_id).await?;
        let room = room.lock().await;
        Ok(room.game.clone())
    }

    /// Run `f` with exclusive access to one room.
    pub async fn with_room<F, T>(&self, game_id: GameId, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut GameRoom) -> Result<T, ServiceError>,
    {
        let handle = self.get(game_id).await?;
        let mut room = handle.lock().await;
        f(&mut room)
    }

    pub async fn game_ids(&self) -> Vec<GameId> {
        let rooms = self.rooms.read().await;
        let mut ids: Vec<GameId> = rooms.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of the games matching `pred`, sorted. Each room is locked on its own, after
    /// the map lock is released.
    pub async fn game_ids_where<P>(&self, pred: P) -> Vec<GameId>
    where
        P: Fn(&Game) -> bool,
    {
        let handles: Vec<(GameId, Arc<Mutex<GameRoom>>)> = {
            let rooms = self.rooms.read().await;
            rooms.iter().map(|(&id, room)| (id, room.clone())).collect()
        };

        let mut ids = Vec::new();
        for (id, handle) in handles {
            if pred(&handle.lock().await.game) {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        ids
    }
}
