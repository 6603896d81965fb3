use std::sync::Arc;

use seki_service::AppState;
use seki_service::config::Config;
use seki_service::driver::handle_line;
use seki_service::notifier::NoopNotifier;
use serde_json::{Value, json};

async fn send(state: &AppState, command: Value) -> Value {
    let reply = handle_line(state, &command.to_string()).await;
    serde_json::from_str(&reply).unwrap()
}

#[tokio::test]
async fn plays_a_game_over_json_lines() {
    let state = AppState::new(Config::default(), Arc::new(NoopNotifier));

    let created = send(
        &state,
        json!({"action": "create", "player_id": 7, "board_size": 9, "description": "friendly"}),
    )
    .await;
    assert_eq!(created["kind"], "ok");
    let game_id = created["data"]["game_id"].as_i64().unwrap();

    let joined = send(&state, json!({"action": "join", "game_id": game_id, "player_id": 8})).await;
    assert_eq!(joined["data"]["status"], "active");

    let played = send(
        &state,
        json!({"action": "play", "game_id": game_id, "player_id": 7, "pos": 40}),
    )
    .await;
    assert_eq!(played["kind"], "ok");
    assert_eq!(played["action"], "play");
    assert_eq!(played["data"]["move_num"], 1);
    assert_eq!(played["data"]["changed"], json!([40]));

    let shown = send(
        &state,
        json!({"action": "show", "game_id": game_id, "player_id": 8}),
    )
    .await;
    assert_eq!(shown["data"]["tiles"][40]["tile"], 1);
    assert_eq!(shown["data"]["tiles"][40]["last_move"], true);
    assert_eq!(shown["data"]["active_player"], 8);

    // Only games still waiting for an opponent are listed.
    let waiting = send(&state, json!({"action": "create", "player_id": 9})).await;
    let waiting_id = waiting["data"]["game_id"].as_i64().unwrap();
    let listed = send(&state, json!({"action": "list"})).await;
    assert_eq!(listed["data"]["game_ids"], json!([waiting_id]));

    let undone = send(
        &state,
        json!({"action": "undo", "game_id": game_id, "player_id": 7}),
    )
    .await;
    assert_eq!(undone["action"], "undo");
    assert_eq!(undone["data"]["move_num"], 0);
    assert_eq!(undone["data"]["changed"], json!([40]));
}

#[tokio::test]
async fn errors_are_reported_in_band() {
    let state = AppState::new(Config::default(), Arc::new(NoopNotifier));
    let created = send(&state, json!({"action": "create", "player_id": 7})).await;
    let game_id = created["data"]["game_id"].as_i64().unwrap();

    let early = send(
        &state,
        json!({"action": "play", "game_id": game_id, "player_id": 7, "pos": 0}),
    )
    .await;
    assert_eq!(early["kind"], "error");
    assert_eq!(early["error_kind"], "illegal state");
    assert_eq!(early["message"], "game is open");

    let missing = send(&state, json!({"action": "pass", "game_id": 99, "player_id": 7})).await;
    assert_eq!(missing["error_kind"], "not found");

    let garbage = handle_line(&state, "{not json").await;
    let garbage: Value = serde_json::from_str(&garbage).unwrap();
    assert_eq!(garbage["kind"], "error");
    assert_eq!(garbage["error_kind"], "validation");

    let unknown = send(&state, json!({"action": "teleport"})).await;
    assert_eq!(unknown["kind"], "error");
}

#[tokio::test]
async fn undo_handshake_over_json_lines() {
    let state = AppState::new(Config::default(), Arc::new(NoopNotifier));
    let created = send(&state, json!({"action": "create", "player_id": 7, "board_size": 9})).await;
    let game_id = created["data"]["game_id"].as_i64().unwrap();
    send(&state, json!({"action": "join", "game_id": game_id, "player_id": 8})).await;
    send(
        &state,
        json!({"action": "play", "game_id": game_id, "player_id": 7, "pos": 40}),
    )
    .await;

    let requested = send(
        &state,
        json!({"action": "request_undo", "game_id": game_id, "player_id": 7}),
    )
    .await;
    let token = requested["data"]["move_num"].as_u64().unwrap();

    let answered = send(
        &state,
        json!({
            "action": "respond_to_undo",
            "game_id": game_id,
            "player_id": 8,
            "accept": true,
            "token": token,
        }),
    )
    .await;
    assert_eq!(answered["data"]["accepted"], true);
    assert_eq!(answered["data"]["change"]["move_num"], 0);
}
