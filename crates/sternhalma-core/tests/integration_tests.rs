//! Integration tests for the Sternhalma client core.
//!
//! These tests drive the session with raw server JSON, the way a front end
//! does, and check the highlight engine on full opening positions.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sternhalma_core::session::{MenuPage, Notice, Seat};
use sternhalma_core::*;
use std::collections::HashSet;
use std::time::{Duration, Instant};

struct Client {
    session: SessionStateMachine,
    transport: OutboxTransport,
    store: MemoryCredentialStore,
}

impl Client {
    fn connected() -> Self {
        Self {
            session: SessionStateMachine::new(),
            transport: OutboxTransport::new(true),
            store: MemoryCredentialStore::new(),
        }
    }

    fn receive(&mut self, message: Value) -> Result<(), SessionError> {
        let mut ctx = SessionContext::new(&mut self.transport, &mut self.store);
        self.session.handle_text(&mut ctx, &message.to_string())
    }

    fn act(&mut self, intent: Intent) -> Result<(), SessionError> {
        let mut ctx = SessionContext::new(&mut self.transport, &mut self.store);
        self.session.handle_intent(&mut ctx, intent)
    }

    fn on_connected(&mut self) -> Result<(), SessionError> {
        let mut ctx = SessionContext::new(&mut self.transport, &mut self.store);
        self.session.on_connected(&mut ctx)
    }

    /// Outbound messages as JSON values
    fn sent(&mut self) -> Vec<Value> {
        self.transport
            .drain()
            .iter()
            .map(|m| serde_json::to_value(m).unwrap())
            .collect()
    }
}

fn coord(col: i32, row: i32) -> BoardCoordinate {
    BoardCoordinate::new(col, row).unwrap()
}

fn conn(name: &str, color: u8, is_bot: bool, connected: bool) -> Value {
    json!({
        "name": if is_bot { Value::Null } else { json!(name) },
        "color": color,
        "is_bot": is_bot,
        "connected": connected,
        "websocket_last_state_change_time": 1700000000.0
    })
}

fn game_state(board: &BoardState, players: &[u8], turn: usize, status: u8, color: u8) -> Value {
    json!({
        "id": "ABCD1234",
        "type": "game_state",
        "board": board,
        "players": players,
        "turn": turn,
        "status": status,
        "prev_moves": [],
        "connections": [
            conn("Ann", 1, false, true),
            conn("", 2, true, true),
            conn("Cy", 4, false, false),
        ],
        "user_id": "00000007",
        "color": color
    })
}

#[test]
fn test_scenario_fresh_board_single_step() {
    // Red's (7, 3) sits on the inner edge of its home: two empty neighbours,
    // everything else is red.
    let board = BoardState::standard();
    let mv = Move::starting_at(coord(7, 3));
    let legal = legal_next(&board, Player::Red, true, &mv);

    let expected: HashSet<_> = [coord(7, 4), coord(8, 4)].into_iter().collect();
    assert_eq!(legal, expected);
    assert!(legal.iter().all(|c| board.is_empty(*c)));
}

#[test]
fn test_scenario_fresh_board_every_red_piece() {
    let board = BoardState::standard();
    for origin in Player::Red.home() {
        let legal = legal_next(&board, Player::Red, true, &Move::starting_at(origin));
        for cell in &legal {
            assert!(board.is_empty(*cell), "{} is occupied", cell);
            assert_ne!(*cell, origin);
        }
    }
}

#[test]
fn test_scenario_chain_never_revisits() {
    let grid_with = |pieces: &[(i32, i32, u8)]| {
        let mut grid = vec![vec![0u8; 17]; 17];
        for &(c, r, p) in pieces {
            grid[c as usize][r as usize] = p;
        }
        serde_json::from_value::<BoardState>(json!(grid)).unwrap()
    };

    // P = (6, 6) jumps over (7, 7) to Q = (8, 8), then over (8, 9) to
    // R = (8, 10). Hopping back over (8, 9) would land on Q, which is empty.
    let board = grid_with(&[(6, 6, 1), (7, 7, 2), (8, 9, 2)]);
    let (p, q, r) = (coord(6, 6), coord(8, 8), coord(8, 10));
    let mv = Move::from_path(vec![p, q, r]).unwrap();
    assert!(board.is_empty(q));

    let legal = legal_next(&board, Player::Red, true, &mv);
    assert!(!legal.contains(&q));
    assert!(legal.is_empty());
}

#[test]
fn test_scenario_game_over_resolves_winner() {
    let mut client = Client::connected();
    let board = BoardState::with_players(&[Player::Red, Player::Blue, Player::Green]);

    // Blue is flagged as holding the turn
    client
        .receive(game_state(&board, &[1, 2, 4], 1, 1, 1))
        .unwrap();
    assert_eq!(
        client.store.load(),
        Some(Credentials::new("ABCD1234", "00000007"))
    );

    // Blue's winning move: the server advances the turn to Green, then concludes
    let mut concluding = game_state(&board, &[1, 2, 4], 2, 2, 1);
    concluding["prev_moves"] = json!([[3, 7], [4, 8]]);
    client.receive(concluding).unwrap();
    let game = client.session.game();
    assert!(game.is_over());
    assert_eq!(game.winner(), Some(Player::Blue));
    assert_eq!(client.store.load(), None);

    // A later snapshot does not undo the result
    client
        .receive(game_state(&board, &[1, 2, 4], 0, 2, 1))
        .unwrap();
    assert_eq!(client.session.game().winner(), Some(Player::Blue));
    assert_eq!(client.store.load(), None);
}

#[test]
fn test_scenario_reconnect_gives_up() {
    let start = Instant::now();
    let mut policy = ReconnectPolicy::new();

    let mut now = start;
    while policy.should_attempt(now) {
        policy.record_attempt(now);
        now += Duration::from_secs(3);
    }

    assert_eq!(policy.attempts(), 3);
    assert_eq!(policy.status(false), ConnectionStatus::Unavailable);
    assert!(!policy.should_attempt(start + Duration::from_secs(600)));
}

#[test]
fn test_create_lobby_and_play_flow() {
    let mut client = Client::connected();

    client.act(Intent::CreateGame).unwrap();
    client.act(Intent::SubmitName { name: "Ann".into() }).unwrap();
    assert_eq!(client.sent(), vec![json!({"type": "create", "name": "Ann"})]);

    client
        .receive(json!({
            "id": "ABCD1234",
            "type": "game_state",
            "status": 0,
            "connections": [conn("Ann", 1, false, true)],
            "user_id": "00000007",
            "color": 1
        }))
        .unwrap();
    assert_eq!(client.session.screen(), Screen::Lobby);
    assert_eq!(client.session.lobby().game_id(), "ABCD1234");
    assert_eq!(
        client.session.lobby().seat(Player::Red),
        &Seat::Local("Ann".into())
    );
    assert_eq!(client.store.load(), None);

    client
        .act(Intent::Seat {
            color: Player::Green,
            action: SeatAction::AddBot,
        })
        .unwrap();
    client.act(Intent::StartGame).unwrap();
    assert_eq!(
        client.sent(),
        vec![
            json!({"type": "add_bot", "color": 4}),
            json!({"type": "start"}),
        ]
    );

    let board = BoardState::with_players(&[Player::Red, Player::Green]);
    client.receive(game_state(&board, &[1, 4], 0, 1, 1)).unwrap();
    assert_eq!(client.session.screen(), Screen::Game);
    assert!(client.session.game().is_local_turn());

    client.act(Intent::ClickCell(coord(7, 3))).unwrap();
    client.act(Intent::ClickCell(coord(8, 4))).unwrap();
    assert!(client
        .session
        .active_components()
        .contains(&Component::ClearMoveButton));
    client.act(Intent::SubmitMove).unwrap();
    assert_eq!(
        client.sent(),
        vec![json!({"type": "move", "moves": [[7, 3], [8, 4]]})]
    );

    // The server answers with the move applied and the turn passed on
    let mut grid = board.to_grid();
    grid[7][3] = Player::Spectator;
    grid[8][4] = Player::Red;
    let after = BoardState::from_grid(grid).unwrap();
    let mut snapshot = game_state(&after, &[1, 4], 1, 1, 1);
    snapshot["prev_moves"] = json!([[7, 3], [8, 4]]);
    client.receive(snapshot).unwrap();

    let game = client.session.game();
    assert!(!game.is_local_turn());
    assert_eq!(game.previous_move(), &[coord(7, 3), coord(8, 4)]);
    assert_eq!(game.board().get(coord(8, 4)), Player::Red);
    assert!(game.highlights().is_empty());
    assert!(!client
        .session
        .active_components()
        .contains(&Component::EndTurnButton));
}

#[test]
fn test_roster_from_snapshot() {
    let mut client = Client::connected();
    let board = BoardState::with_players(&[Player::Red, Player::Blue, Player::Green]);
    client
        .receive(game_state(&board, &[1, 2, 4], 2, 1, 2))
        .unwrap();

    let roster = client.session.game().roster();
    let summary: Vec<_> = roster
        .iter()
        .map(|p| (p.color, p.status, p.is_turn, p.is_local))
        .collect();
    use sternhalma_core::session::PlayerStatus::*;
    assert_eq!(
        summary,
        vec![
            (Player::Red, Human, false, false),
            (Player::Blue, Bot, false, true),
            (Player::Green, Reconnecting, true, false),
        ]
    );
    assert_eq!(roster[1].name, "Bot");
}

#[test]
fn test_reconnect_after_restart() {
    let mut client = Client::connected();
    client.store.save(&Credentials::new("ABCD1234", "00000007"));
    client.on_connected().unwrap();
    assert_eq!(
        client.sent(),
        vec![json!({"type": "reconnect", "game_id": "ABCD1234", "user_id": "00000007"})]
    );

    // The game is gone by now
    let result = client.receive(json!({
        "type": "status",
        "status": "InvalidWebSocketAction: Game does not exist"
    }));
    assert_eq!(result, Err(SessionError::UnknownOrExpiredGame));
    assert_eq!(client.session.screen(), Screen::Menu);
    assert_eq!(client.session.menu().page(), &MenuPage::Main);
    assert_eq!(client.session.menu().notice(), Some(Notice::InvalidGameCode));
    assert_eq!(client.store.load(), None);
}

#[test]
fn test_garbage_is_dropped() {
    let mut client = Client::connected();
    client.act(Intent::CreateGame).unwrap();

    client.receive(json!({"type": "game_state", "status": 9})).unwrap();
    client.receive(json!({"type": "something_else"})).unwrap();
    client
        .receive(json!({"type": "status", "status": "Success"}))
        .unwrap();

    assert_eq!(client.session.screen(), Screen::Menu);
    assert!(matches!(
        client.session.menu().page(),
        MenuPage::EnterName(_)
    ));
}

#[test]
fn test_disconnected_intents_leave_state_alone() {
    let mut client = Client::connected();
    let board = BoardState::with_players(&[Player::Red, Player::Green]);
    client.receive(game_state(&board, &[1, 4], 0, 1, 1)).unwrap();
    client.act(Intent::ClickCell(coord(7, 3))).unwrap();
    client.transport.set_connected(false);

    assert_eq!(
        client.act(Intent::SubmitMove),
        Err(SessionError::TransportUnavailable)
    );
    assert_eq!(client.session.game().current_move().len(), 1);
    assert!(client.sent().is_empty());
}

#[test]
fn test_projection_layout() {
    // Cells in one row share a y coordinate and sit 42 px apart
    let a = project(coord(4, 8));
    let b = project(coord(5, 8));
    assert_eq!(a.y, b.y);
    assert_eq!(b.x - a.x, 42.0);

    // Every cell lands inside an 800 x 800 canvas
    for cell in BoardCoordinate::all() {
        let p = project(cell);
        assert!((0.0..800.0).contains(&p.x), "{} at x {}", cell, p.x);
        assert!((0.0..800.0).contains(&p.y), "{} at y {}", cell, p.y);
    }
}
