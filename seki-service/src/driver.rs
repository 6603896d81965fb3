use go_engine::{GameId, GameMode, PlayerId, Pos, TimeSettings};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::error::ServiceError;
use crate::game_actions::{self, NewGame};

/// One line of driver input.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    Create {
        player_id: PlayerId,
        board_size: Option<u8>,
        #[serde(default)]
        description: String,
        #[serde(default)]
        mode: GameMode,
        #[serde(default)]
        time_settings: TimeSettings,
        #[serde(default)]
        handicap: bool,
    },
    Join {
        game_id: GameId,
        player_id: PlayerId,
    },
    Play {
        game_id: GameId,
        player_id: PlayerId,
        pos: Pos,
    },
    Pass {
        game_id: GameId,
        player_id: PlayerId,
    },
    Resign {
        game_id: GameId,
        player_id: PlayerId,
    },
    MarkDead {
        game_id: GameId,
        player_id: PlayerId,
        pos: Pos,
    },
    DoneScoring {
        game_id: GameId,
        player_id: PlayerId,
    },
    Undo {
        game_id: GameId,
        player_id: PlayerId,
    },
    RequestUndo {
        game_id: GameId,
        player_id: PlayerId,
    },
    RespondToUndo {
        game_id: GameId,
        player_id: PlayerId,
        accept: bool,
        token: u32,
    },
    Show {
        game_id: GameId,
        player_id: Option<PlayerId>,
    },
    /// Games still waiting for an opponent.
    List,
}

impl Command {
    pub fn action(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::Join { .. } => "join",
            Command::Play { .. } => "play",
            Command::Pass { .. } => "pass",
            Command::Resign { .. } => "resign",
            Command::MarkDead { .. } => "mark_dead",
            Command::DoneScoring { .. } => "done_scoring",
            Command::Undo { .. } => "undo",
            Command::RequestUndo { .. } => "request_undo",
            Command::RespondToUndo { .. } => "respond_to_undo",
            Command::Show { .. } => "show",
            Command::List => "list",
        }
    }
}

pub async fn dispatch(state: &AppState, command: Command) -> Result<Value, ServiceError> {
    let data = match command {
        Command::Create {
            player_id,
            board_size,
            description,
            mode,
            time_settings,
            handicap,
        } => {
            let new_game = NewGame {
                board_size,
                description,
                mode,
                time_settings,
                handicap,
            };
            let game_id = game_actions::create_game(state, player_id, new_game).await?;
            json!({ "game_id": game_id })
        }
        Command::Join { game_id, player_id } => {
            json!(game_actions::join_game(state, game_id, player_id).await?)
        }
        Command::Play {
            game_id,
            player_id,
            pos,
        } => json!(game_actions::play_move(state, game_id, player_id, pos).await?),
        Command::Pass { game_id, player_id } => {
            json!(game_actions::pass(state, game_id, player_id).await?)
        }
        Command::Resign { game_id, player_id } => {
            json!(game_actions::resign(state, game_id, player_id).await?)
        }
        Command::MarkDead {
            game_id,
            player_id,
            pos,
        } => json!(game_actions::mark_dead_stone(state, game_id, player_id, pos).await?),
        Command::DoneScoring { game_id, player_id } => {
            json!(game_actions::done_scoring(state, game_id, player_id).await?)
        }
        Command::Undo { game_id, player_id } => {
            json!(game_actions::undo(state, game_id, player_id).await?)
        }
        Command::RequestUndo { game_id, player_id } => {
            json!(game_actions::request_undo(state, game_id, player_id).await?)
        }
        Command::RespondToUndo {
            game_id,
            player_id,
            accept,
            token,
        } => {
            let change =
                game_actions::respond_to_undo(state, game_id, player_id, accept, token).await?;
            json!({ "accepted": change.is_some(), "change": change })
        }
        Command::Show { game_id, player_id } => {
            json!(game_actions::game_view(state, game_id, player_id).await?)
        }
        Command::List => {
            let open = state
                .registry
                .game_ids_where(|game| game.status().is_open())
                .await;
            json!({ "game_ids": open })
        }
    };
    Ok(data)
}

/// Handle one line of input and produce the reply line.
pub async fn handle_line(state: &AppState, line: &str) -> String {
    let command: Command = match serde_json::from_str(line) {
        Ok(command) => command,
        Err(e) => {
            tracing::debug!("unparseable command: {e}");
            return json!({
                "kind": "error",
                "error_kind": "validation",
                "message": format!("invalid command: {e}"),
            })
            .to_string();
        }
    };

    let action = command.action();
    let reply = match dispatch(state, command).await {
        Ok(data) => json!({ "kind": "ok", "action": action, "data": data }),
        Err(e) => {
            if e.is_fault() {
                tracing::error!("Error handling {action}: {e}");
            } else {
                tracing::debug!("Rejected {action}: {e}");
            }
            json!({
                "kind": "error",
                "action": action,
                "error_kind": e.kind().to_string(),
                "message": e.to_string(),
            })
        }
    };
    reply.to_string()
}
