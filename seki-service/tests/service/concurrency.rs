use go_engine::{GameOptions, GoError};
use seki_service::error::ServiceError;
use seki_service::game_actions;

use crate::common::{BLACK, TestService, WHITE};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_moves_append_once() {
    let service = TestService::start(9).await;

    let mut handles = Vec::new();
    for pos in [10, 20, 30, 40] {
        let state = service.state.clone();
        let game_id = service.game_id;
        handles.push(tokio::spawn(async move {
            game_actions::play_move(&state, game_id, BLACK, pos).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(change) => {
                assert_eq!(change.move_num, 1);
                accepted += 1;
            }
            Err(err) => assert!(matches!(err, ServiceError::Game(GoError::OutOfTurn))),
        }
    }
    assert_eq!(accepted, 1);

    let game = service.game().await;
    assert_eq!(game.move_num(), 1);
    assert_eq!(game.snapshots().len(), 2);
    assert_eq!(service.events.take().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn games_progress_independently() {
    let service = TestService::start(9).await;
    let registry = &service.state.registry;

    let mut game_ids = vec![service.game_id];
    for _ in 0..3 {
        let game_id = registry
            .create_game(9, BLACK, GameOptions::default())
            .await
            .unwrap();
        game_actions::join_game(&service.state, game_id, WHITE)
            .await
            .unwrap();
        game_ids.push(game_id);
    }

    let mut handles = Vec::new();
    for &game_id in &game_ids {
        let state = service.state.clone();
        handles.push(tokio::spawn(async move {
            for (player, pos) in [(BLACK, 0), (WHITE, 1), (BLACK, 2), (WHITE, 3)] {
                game_actions::play_move(&state, game_id, player, pos).await?;
            }
            Ok::<_, ServiceError>(())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for game_id in game_ids {
        assert_eq!(registry.game(game_id).await.unwrap().move_num(), 4);
    }
}
