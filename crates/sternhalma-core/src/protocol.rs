//! JSON messages exchanged with the game server.
//!
//! The server pushes two kinds of message, told apart by `"type"`:
//!
//! - `"status"`: a free-form string acknowledging or rejecting the last request
//! - `"game_state"`: a full snapshot of the room, whose `"status"` field says
//!   whether it is still a lobby (`0`), a running game (`1`) or a finished one
//!   (`2`). Lobby snapshots carry no board.
//!
//! Everything the client sends is a [`ClientMessage`].

use crate::board::BoardState;
use crate::coord::BoardCoordinate;
use crate::moves::Move;
use crate::player::Player;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status text the server sends when a game code is unknown or expired
pub const GAME_DOES_NOT_EXIST: &str = "InvalidWebSocketAction: Game does not exist";

/// Errors from decoding server messages
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown game status {0}")]
    UnknownStatus(u8),

    #[error("Game snapshot is missing `{0}`")]
    MissingField(&'static str),

    #[error("Turn index {turn} is out of range for {seats} seats")]
    TurnOutOfRange { turn: usize, seats: usize },
}

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Open a new room and join it
    #[serde(rename = "create")]
    CreateGame { name: String },

    /// Join an existing room by code
    #[serde(rename = "join")]
    JoinGame { game_id: String, name: String },

    /// Resume a seat after losing the connection
    #[serde(rename = "reconnect")]
    ReconnectGame { game_id: String, user_id: String },

    /// Take a seat, or leave it with [`Player::Spectator`]
    SelectColor { color: Player },

    AddBot { color: Player },

    RemoveBot { color: Player },

    #[serde(rename = "start")]
    StartGame,

    /// Submit the path of a piece; an empty path passes the turn
    #[serde(rename = "move")]
    MakeMove { moves: Move },
}

/// A connection listed in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Player name; absent for some bots
    #[serde(default)]
    pub name: Option<String>,
    pub color: Player,
    pub is_bot: bool,
    pub connected: bool,
}

impl ConnectionInfo {
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None if self.is_bot => "Bot",
            None => "",
        }
    }
}

/// Room status as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GameStatus {
    Lobby,
    InProgress,
    Over,
}

impl TryFrom<u8> for GameStatus {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GameStatus::Lobby),
            1 => Ok(GameStatus::InProgress),
            2 => Ok(GameStatus::Over),
            other => Err(ProtocolError::UnknownStatus(other)),
        }
    }
}

impl From<GameStatus> for u8 {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Lobby => 0,
            GameStatus::InProgress => 1,
            GameStatus::Over => 2,
        }
    }
}

/// A room that has not started yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbySnapshot {
    pub game_id: String,
    /// Seat of the receiving connection
    pub color: Player,
    pub user_id: Option<String>,
    pub connections: Vec<ConnectionInfo>,
}

/// A running or finished game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub game_id: String,
    pub board: BoardState,
    /// Seated colors in turn order
    pub players: Vec<Player>,
    /// Index into `players` of whose turn it is
    pub turn: usize,
    pub status: GameStatus,
    /// Path of the most recent move, for the arrow overlay
    pub previous_move: Vec<BoardCoordinate>,
    pub connections: Vec<ConnectionInfo>,
    pub user_id: Option<String>,
    /// Seat of the receiving connection
    pub color: Player,
}

impl GameSnapshot {
    /// Whose turn it is, `None` if `turn` is out of range
    pub fn current_player(&self) -> Option<Player> {
        self.players.get(self.turn).copied()
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::Over
    }
}

/// An authoritative room state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Lobby(LobbySnapshot),
    Game(GameSnapshot),
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawServerMessage")]
pub enum ServerMessage {
    Status(String),
    Snapshot(Snapshot),
}

impl ServerMessage {
    /// Decode a message from its JSON text
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let raw: RawServerMessage = serde_json::from_str(text)?;
        raw.try_into()
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawServerMessage {
    Status { status: String },
    GameState(RawGameState),
}

#[derive(Deserialize)]
struct RawGameState {
    id: String,
    status: GameStatus,
    #[serde(default)]
    color: Player,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    connections: Vec<ConnectionInfo>,
    board: Option<BoardState>,
    players: Option<Vec<Player>>,
    turn: Option<usize>,
    #[serde(default)]
    prev_moves: Vec<BoardCoordinate>,
}

impl TryFrom<RawServerMessage> for ServerMessage {
    type Error = ProtocolError;

    fn try_from(raw: RawServerMessage) -> Result<Self, Self::Error> {
        let state = match raw {
            RawServerMessage::Status { status } => return Ok(ServerMessage::Status(status)),
            RawServerMessage::GameState(state) => state,
        };

        if state.status == GameStatus::Lobby {
            return Ok(ServerMessage::Snapshot(Snapshot::Lobby(LobbySnapshot {
                game_id: state.id,
                color: state.color,
                user_id: state.user_id,
                connections: state.connections,
            })));
        }

        let board = state.board.ok_or(ProtocolError::MissingField("board"))?;
        let players = state.players.ok_or(ProtocolError::MissingField("players"))?;
        let turn = state.turn.ok_or(ProtocolError::MissingField("turn"))?;
        if turn >= players.len() {
            return Err(ProtocolError::TurnOutOfRange {
                turn,
                seats: players.len(),
            });
        }

        Ok(ServerMessage::Snapshot(Snapshot::Game(GameSnapshot {
            game_id: state.id,
            board,
            players,
            turn,
            status: state.status,
            previous_move: state.prev_moves,
            connections: state.connections,
            user_id: state.user_id,
            color: state.color,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outbound_shapes() {
        let cases = [
            (
                ClientMessage::CreateGame { name: "Ann".into() },
                json!({"type": "create", "name": "Ann"}),
            ),
            (
                ClientMessage::JoinGame {
                    game_id: "12345678".into(),
                    name: "Ann".into(),
                },
                json!({"type": "join", "game_id": "12345678", "name": "Ann"}),
            ),
            (
                ClientMessage::ReconnectGame {
                    game_id: "12345678".into(),
                    user_id: "00000042".into(),
                },
                json!({"type": "reconnect", "game_id": "12345678", "user_id": "00000042"}),
            ),
            (
                ClientMessage::SelectColor {
                    color: Player::Spectator,
                },
                json!({"type": "select_color", "color": 0}),
            ),
            (
                ClientMessage::AddBot { color: Player::Blue },
                json!({"type": "add_bot", "color": 2}),
            ),
            (
                ClientMessage::RemoveBot { color: Player::Blue },
                json!({"type": "remove_bot", "color": 2}),
            ),
            (ClientMessage::StartGame, json!({"type": "start"})),
            (
                ClientMessage::MakeMove { moves: Move::new() },
                json!({"type": "move", "moves": []}),
            ),
        ];

        for (message, expected) in cases {
            assert_eq!(serde_json::to_value(&message).unwrap(), expected);
        }
    }

    #[test]
    fn test_status_message() {
        let msg = ServerMessage::parse(r#"{"type": "status", "status": "Success"}"#).unwrap();
        assert_eq!(msg, ServerMessage::Status("Success".into()));
    }

    #[test]
    fn test_lobby_snapshot() {
        let text = json!({
            "id": "12345678",
            "type": "game_state",
            "status": 0,
            "connections": [
                {"name": "Ann", "color": 1, "is_bot": false, "connected": true,
                 "websocket_last_state_change_time": 1700000000.5},
                {"name": null, "color": 3, "is_bot": true, "connected": false}
            ],
            "user_id": "00000042",
            "color": 1
        })
        .to_string();

        let ServerMessage::Snapshot(Snapshot::Lobby(lobby)) = ServerMessage::parse(&text).unwrap()
        else {
            panic!("expected a lobby snapshot");
        };
        assert_eq!(lobby.game_id, "12345678");
        assert_eq!(lobby.color, Player::Red);
        assert_eq!(lobby.connections.len(), 2);
        assert_eq!(lobby.connections[1].display_name(), "Bot");
    }

    #[test]
    fn test_game_snapshot() {
        let board = BoardState::with_players(&[Player::Red, Player::Green]);
        let text = json!({
            "id": "12345678",
            "type": "game_state",
            "board": board.to_grid(),
            "players": [1, 4],
            "turn": 1,
            "status": 1,
            "prev_moves": [[7, 3], [7, 4]],
            "connections": [],
            "user_id": "00000042",
            "color": 4
        })
        .to_string();

        let ServerMessage::Snapshot(Snapshot::Game(game)) = ServerMessage::parse(&text).unwrap()
        else {
            panic!("expected a game snapshot");
        };
        assert_eq!(game.board, board);
        assert_eq!(game.current_player(), Some(Player::Green));
        assert!(!game.is_over());
        assert_eq!(game.previous_move.len(), 2);
    }

    #[test]
    fn test_rejects_bad_snapshots() {
        let unknown_status = json!({"type": "game_state", "id": "1", "status": 7}).to_string();
        assert!(ServerMessage::parse(&unknown_status).is_err());

        let no_board = json!({"type": "game_state", "id": "1", "status": 1}).to_string();
        assert!(matches!(
            ServerMessage::parse(&no_board),
            Err(ProtocolError::MissingField("board"))
        ));

        let bad_turn = json!({
            "type": "game_state", "id": "1", "status": 1,
            "board": BoardState::empty().to_grid(), "players": [1], "turn": 1
        })
        .to_string();
        assert!(matches!(
            ServerMessage::parse(&bad_turn),
            Err(ProtocolError::TurnOutOfRange { turn: 1, seats: 1 })
        ));

        assert!(ServerMessage::parse("not json").is_err());
    }
}
