use go_engine::{GameStatus, GoError, Stone, TieBreak, Tile};
use seki_service::config::Config;
use seki_service::error::ServiceError;
use seki_service::game_actions;
use seki_service::notifier::GameEvent;

use crate::common::{BLACK, TestService, WHITE};

/// Black wall on column 1, White wall on column 2 of a 4x4 board, then two passes.
async fn walls(service: &TestService) {
    for (player, pos) in [
        (BLACK, 1),
        (WHITE, 2),
        (BLACK, 5),
        (WHITE, 6),
        (BLACK, 9),
        (WHITE, 10),
        (BLACK, 13),
        (WHITE, 14),
    ] {
        service.play(player, pos).await;
    }
    service.pass(BLACK).await;
    service.pass(WHITE).await;
}

#[tokio::test]
async fn second_pass_opens_scoring() {
    let service = TestService::start(4).await;
    walls(&service).await;

    let events = service.events.take();
    let Some(GameEvent::ScoringUpdate { score, changed, .. }) = events.last() else {
        panic!("expected scoring_update, got {events:?}");
    };
    assert_eq!(changed.len(), 16);
    assert_eq!(score.black.territory, 4);
    assert_eq!(score.white.territory, 4);
    assert_eq!(service.game().await.status(), GameStatus::EndGameScoring);

    let err = game_actions::play_move(&service.state, service.game_id, BLACK, 0)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Game(GoError::WrongStatus(GameStatus::EndGameScoring))
    ));
}

#[tokio::test]
async fn marking_resets_agreement_and_scores_dead_stones() {
    let service = TestService::start(4).await;
    walls(&service).await;

    game_actions::done_scoring(&service.state, service.game_id, BLACK)
        .await
        .unwrap();
    game_actions::mark_dead_stone(&service.state, service.game_id, WHITE, 6)
        .await
        .unwrap();
    let game = service.game().await;
    assert!(!game.done_scoring(Stone::Black));
    assert!(game.active_board().is_dead(14));
    service.events.take();

    game_actions::done_scoring(&service.state, service.game_id, WHITE)
        .await
        .unwrap();
    game_actions::done_scoring(&service.state, service.game_id, BLACK)
        .await
        .unwrap();
    assert_eq!(
        service.events.kinds(),
        vec!["scoring_update", "game_update", "game_finished"]
    );

    let game = service.game().await;
    assert_eq!(game.status(), GameStatus::Finished);
    assert_eq!(game.active_board().tile(6), Some(Tile::Empty));
    assert_eq!(game.result().unwrap().to_string(), "B+16");
}

#[tokio::test]
async fn configured_komi_and_tie_break_apply() {
    let mut config = Config::default();
    config.rules.tie_break = TieBreak::White;
    let service = TestService::start_with(config, 4).await;
    walls(&service).await;

    game_actions::done_scoring(&service.state, service.game_id, WHITE)
        .await
        .unwrap();
    game_actions::done_scoring(&service.state, service.game_id, BLACK)
        .await
        .unwrap();
    let game = service.game().await;
    assert_eq!(game.result().unwrap().winner(), Some(Stone::White));

    let mut config = Config::default();
    config.rules.komi = 6.5;
    let service = TestService::start_with(config, 4).await;
    walls(&service).await;
    game_actions::done_scoring(&service.state, service.game_id, WHITE)
        .await
        .unwrap();
    game_actions::done_scoring(&service.state, service.game_id, BLACK)
        .await
        .unwrap();
    assert_eq!(
        service.game().await.result().unwrap().to_string(),
        "W+6.5"
    );
}
