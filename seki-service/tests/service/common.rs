#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use go_engine::{GameId, PlayerId};
use seki_service::AppState;
use seki_service::config::Config;
use seki_service::game_actions::{self, NewGame};
use seki_service::notifier::{GameEvent, Notifier};

pub const BLACK: PlayerId = 100;
pub const WHITE: PlayerId = 200;
pub const STRANGER: PlayerId = 999;

/// Keeps every event so tests can inspect what was sent.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<GameEvent>>,
}

impl RecordingNotifier {
    pub fn take(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.take().iter().map(GameEvent::kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &GameEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// A service with one joined game: `BLACK` created it, `WHITE` joined.
pub struct TestService {
    pub state: AppState,
    pub events: Arc<RecordingNotifier>,
    pub game_id: GameId,
}

impl TestService {
    pub async fn start(board_size: u8) -> Self {
        Self::start_with(Config::default(), board_size).await
    }

    pub async fn start_with(config: Config, board_size: u8) -> Self {
        let events = Arc::new(RecordingNotifier::default());
        let state = AppState::new(config, events.clone());
        let new_game = NewGame {
            board_size: Some(board_size),
            ..NewGame::default()
        };
        let game_id = game_actions::create_game(&state, BLACK, new_game)
            .await
            .unwrap();
        game_actions::join_game(&state, game_id, WHITE).await.unwrap();
        events.take();
        TestService {
            state,
            events,
            game_id,
        }
    }

    pub async fn play(&self, player_id: PlayerId, pos: usize) {
        game_actions::play_move(&self.state, self.game_id, player_id, pos)
            .await
            .unwrap();
    }

    pub async fn pass(&self, player_id: PlayerId) {
        game_actions::pass(&self.state, self.game_id, player_id)
            .await
            .unwrap();
    }

    pub async fn game(&self) -> go_engine::Game {
        self.state.registry.game(self.game_id).await.unwrap()
    }
}
