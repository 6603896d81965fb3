use go_engine::{GoError, Tile};
use seki_service::error::ServiceError;
use seki_service::game_actions;
use seki_service::notifier::GameEvent;

use crate::common::{BLACK, STRANGER, TestService, WHITE};

#[tokio::test]
async fn request_accept_rolls_back() {
    let service = TestService::start(9).await;
    service.play(BLACK, 30).await;
    service.events.take();

    let request = game_actions::request_undo(&service.state, service.game_id, BLACK)
        .await
        .unwrap();
    assert_eq!(request.move_num, 1);

    let events = service.events.take();
    let GameEvent::UndoRequest {
        requester,
        recipient,
        ..
    } = &events[0]
    else {
        panic!("expected undo_request, got {:?}", events[0]);
    };
    assert_eq!(*requester, BLACK);
    assert_eq!(*recipient, Some(WHITE));

    let change =
        game_actions::respond_to_undo(&service.state, service.game_id, WHITE, true, request.move_num)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(change.move_num, 0);
    assert!(change.changed.contains(&30));
    assert_eq!(service.events.kinds(), vec!["game_update"]);

    let game = service.game().await;
    assert_eq!(game.active_board().tile(30), Some(Tile::Empty));
    assert_eq!(game.active_player(), Some(BLACK));
}

#[tokio::test]
async fn reject_keeps_the_stone() {
    let service = TestService::start(9).await;
    service.play(BLACK, 30).await;
    game_actions::request_undo(&service.state, service.game_id, BLACK)
        .await
        .unwrap();
    service.events.take();

    let outcome = game_actions::respond_to_undo(&service.state, service.game_id, WHITE, false, 1)
        .await
        .unwrap();
    assert!(outcome.is_none());
    assert!(service.events.take().is_empty());

    let game = service.game().await;
    assert_eq!(game.active_board().tile(30), Some(Tile::Black));

    // The request is gone, so a second answer has nothing to answer.
    let err = game_actions::respond_to_undo(&service.state, service.game_id, WHITE, true, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
}

#[tokio::test]
async fn requester_on_turn_loses_two_moves() {
    let service = TestService::start(9).await;
    service.play(BLACK, 30).await;
    service.play(WHITE, 31).await;

    let request = game_actions::request_undo(&service.state, service.game_id, BLACK)
        .await
        .unwrap();
    let change =
        game_actions::respond_to_undo(&service.state, service.game_id, WHITE, true, request.move_num)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(change.move_num, 0);

    let game = service.game().await;
    assert!(game.active_board().goban().is_empty());
}

#[tokio::test]
async fn only_one_pending_request() {
    let service = TestService::start(9).await;
    service.play(BLACK, 30).await;
    service.play(WHITE, 31).await;
    game_actions::request_undo(&service.state, service.game_id, WHITE)
        .await
        .unwrap();
    let err = game_actions::request_undo(&service.state, service.game_id, BLACK)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
}

#[tokio::test]
async fn only_the_opponent_may_answer() {
    let service = TestService::start(9).await;
    service.play(BLACK, 30).await;
    game_actions::request_undo(&service.state, service.game_id, BLACK)
        .await
        .unwrap();

    let err = game_actions::respond_to_undo(&service.state, service.game_id, BLACK, true, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));

    let err = game_actions::respond_to_undo(&service.state, service.game_id, STRANGER, true, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Game(GoError::NotSeated(STRANGER))));

    // Both refusals left the request in place.
    game_actions::respond_to_undo(&service.state, service.game_id, WHITE, true, 1)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn stale_token_is_refused() {
    let service = TestService::start(9).await;
    service.play(BLACK, 30).await;
    game_actions::request_undo(&service.state, service.game_id, BLACK)
        .await
        .unwrap();

    let err = game_actions::respond_to_undo(&service.state, service.game_id, WHITE, true, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
    assert_eq!(service.game().await.move_num(), 1);

    // The request survives a stale answer and can still be accepted.
    let view = game_actions::game_view(&service.state, service.game_id, None)
        .await
        .unwrap();
    assert_eq!(view.undo_request.map(|r| r.requester), Some(BLACK));

    let change = game_actions::respond_to_undo(&service.state, service.game_id, WHITE, true, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(change.move_num, 0);
    assert!(
        game_actions::game_view(&service.state, service.game_id, None)
            .await
            .unwrap()
            .undo_request
            .is_none()
    );
}

#[tokio::test]
async fn a_move_cancels_the_request() {
    let service = TestService::start(9).await;
    service.play(BLACK, 30).await;
    game_actions::request_undo(&service.state, service.game_id, BLACK)
        .await
        .unwrap();
    service.play(WHITE, 31).await;

    let view = game_actions::game_view(&service.state, service.game_id, None)
        .await
        .unwrap();
    assert!(view.undo_request.is_none());

    let err = game_actions::respond_to_undo(&service.state, service.game_id, WHITE, true, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
    assert_eq!(service.game().await.move_num(), 2);
}

#[tokio::test]
async fn nothing_to_undo_is_refused_up_front() {
    let service = TestService::start(9).await;
    let err = game_actions::request_undo(&service.state, service.game_id, BLACK)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Game(GoError::NothingToUndo)));
    assert!(service.events.take().is_empty());
}

#[tokio::test]
async fn direct_undo_skips_the_handshake() {
    let service = TestService::start(9).await;
    service.play(BLACK, 30).await;
    service.play(WHITE, 31).await;
    game_actions::request_undo(&service.state, service.game_id, BLACK)
        .await
        .unwrap();
    service.events.take();

    // White made the latest move, so only that stone goes.
    let change = game_actions::undo(&service.state, service.game_id, WHITE)
        .await
        .unwrap();
    assert_eq!(change.move_num, 1);
    assert_eq!(change.changed.iter().copied().collect::<Vec<_>>(), vec![31]);
    assert_eq!(service.events.kinds(), vec!["game_update"]);

    let view = game_actions::game_view(&service.state, service.game_id, None)
        .await
        .unwrap();
    assert!(view.undo_request.is_none());
    assert_eq!(view.active_player, Some(WHITE));

    let err = game_actions::undo(&service.state, service.game_id, STRANGER)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Game(GoError::NotSeated(STRANGER))));
}
