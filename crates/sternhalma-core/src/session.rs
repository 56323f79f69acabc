//! Client session state machine.
//!
//! The session is always on exactly one [`Screen`]. Server snapshots move it
//! between screens; user [`Intent`]s either change local screen state or turn
//! into outbound [`ClientMessage`]s. Everything the session touches outside
//! itself (the transport and the credential store) is handed in through a
//! [`SessionContext`] on each call.

use crate::board::BoardState;
use crate::coord::BoardCoordinate;
use crate::credentials::{CredentialStore, Credentials};
use crate::moves::{legal_next, Move};
use crate::player::Player;
use crate::protocol::{
    ClientMessage, ConnectionInfo, GameSnapshot, LobbySnapshot, ServerMessage, Snapshot,
    GAME_DOES_NOT_EXIST,
};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Length of a game code
pub const GAME_CODE_LENGTH: usize = 8;

/// Longest allowed player name
pub const MAX_NAME_LENGTH: usize = 20;

/// Errors surfaced by session operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Not connected to the server")]
    TransportUnavailable,

    #[error("Game does not exist or has expired")]
    UnknownOrExpiredGame,
}

/// Collaborators the session works through
pub struct SessionContext<'a> {
    pub transport: &'a mut dyn Transport,
    pub credentials: &'a mut dyn CredentialStore,
}

impl<'a> SessionContext<'a> {
    pub fn new(
        transport: &'a mut dyn Transport,
        credentials: &'a mut dyn CredentialStore,
    ) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Send a message; while disconnected it is dropped, not queued
    fn send(&mut self, message: ClientMessage) -> Result<(), SessionError> {
        if !self.transport.is_connected() {
            warn!(?message, "Dropping message while disconnected");
            return Err(SessionError::TransportUnavailable);
        }
        debug!(?message, "Sending");
        self.transport.send(message)
    }

    /// Leave the current game for good
    fn abandon(&mut self) {
        self.transport.disconnect();
        self.credentials.clear();
    }
}

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Screen {
    #[default]
    Menu,
    Lobby,
    Game,
}

/// What a user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Menu: open the name page for a new game
    CreateGame,
    /// Menu: open the name page for joining `code`
    JoinGame { code: String },
    /// Menu: confirm the name and send the create/join request
    SubmitName { name: String },
    /// Lobby: act on a seat
    Seat { color: Player, action: SeatAction },
    /// Lobby: start the game
    StartGame,
    /// Game: click a board cell
    ClickCell(BoardCoordinate),
    /// Game: drop the in-progress move
    ClearMove,
    /// Game: send the in-progress move; an empty move passes
    SubmitMove,
    /// Game: return to the menu once the game is over
    MainMenu,
    /// Leave the current page or screen
    Back,
}

// ==================== Menu ====================

/// Messages shown on the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Notice {
    GameCodeLength,
    NameLength,
    InvalidGameCode,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::GameCodeLength => "Game code must be 8 characters long!",
            Notice::NameLength => "Name must be between 1 and 20 characters long!",
            Notice::InvalidGameCode => "Invalid game code!",
        }
    }
}

/// Why the name page is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFor {
    Create,
    Join(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MenuPage {
    #[default]
    Main,
    EnterName(NameFor),
}

#[derive(Debug, Clone, Default)]
pub struct MenuScreen {
    page: MenuPage,
    notice: Option<Notice>,
}

impl MenuScreen {
    pub fn page(&self) -> &MenuPage {
        &self.page
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn open_name_page(&mut self, reason: NameFor) {
        self.page = MenuPage::EnterName(reason);
        self.notice = None;
    }

    fn handle(&mut self, ctx: &mut SessionContext<'_>, intent: Intent) -> Result<(), SessionError> {
        match (self.page.clone(), intent) {
            (MenuPage::Main, Intent::CreateGame) => self.open_name_page(NameFor::Create),
            (MenuPage::Main, Intent::JoinGame { code }) => {
                if code.chars().count() == GAME_CODE_LENGTH {
                    self.open_name_page(NameFor::Join(code));
                } else {
                    self.notice = Some(Notice::GameCodeLength);
                }
            }
            (MenuPage::EnterName(_), Intent::Back) => {
                self.page = MenuPage::Main;
                self.notice = None;
            }
            (MenuPage::EnterName(reason), Intent::SubmitName { name }) => {
                let len = name.chars().count();
                if len == 0 || len > MAX_NAME_LENGTH {
                    self.notice = Some(Notice::NameLength);
                    return Ok(());
                }
                let message = match reason {
                    NameFor::Create => ClientMessage::CreateGame { name },
                    NameFor::Join(game_id) => ClientMessage::JoinGame { game_id, name },
                };
                ctx.send(message)?;
            }
            (page, intent) => debug!(?page, ?intent, "Ignoring intent on menu"),
        }
        Ok(())
    }

    fn components(&self) -> Vec<Component> {
        let mut components = match self.page {
            MenuPage::Main => vec![
                Component::Title,
                Component::CreateGameButton,
                Component::GameCodeInput,
                Component::JoinGameButton,
            ],
            MenuPage::EnterName(_) => vec![
                Component::BackButton,
                Component::NameInput,
                Component::NextButton,
            ],
        };
        if let Some(notice) = self.notice {
            components.push(Component::Notice(notice));
        }
        components
    }
}

// ==================== Lobby ====================

/// Who sits in a lobby seat
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum Seat {
    #[default]
    Empty,
    Bot,
    Human(String),
    /// The local player
    Local(String),
}

/// What can be done with a lobby seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatAction {
    TakeSeat,
    AddBot,
    RemoveBot,
    LeaveSeat,
}

impl Seat {
    /// Actions this seat offers
    pub fn actions(&self) -> &'static [SeatAction] {
        match self {
            Seat::Empty => &[SeatAction::TakeSeat, SeatAction::AddBot],
            Seat::Bot => &[SeatAction::RemoveBot],
            Seat::Human(_) => &[],
            Seat::Local(_) => &[SeatAction::LeaveSeat],
        }
    }

    pub fn label(&self) -> String {
        match self {
            Seat::Empty => String::new(),
            Seat::Bot => "Bot".to_string(),
            Seat::Human(name) => name.clone(),
            Seat::Local(name) => format!("{} (You)", name),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LobbyScreen {
    game_id: String,
    color: Player,
    seats: [Seat; 6],
}

impl LobbyScreen {
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// The local player's seat, `Spectator` if unseated
    pub fn color(&self) -> Player {
        self.color
    }

    pub fn seat(&self, color: Player) -> &Seat {
        match seat_index(color) {
            Some(index) => &self.seats[index],
            None => &Seat::Empty,
        }
    }

    /// Every seat with its color, in color order
    pub fn seats(&self) -> impl Iterator<Item = (Player, &Seat)> {
        Player::COLORS.into_iter().zip(self.seats.iter())
    }

    fn apply(&mut self, snapshot: LobbySnapshot) {
        self.seats = Default::default();
        for connection in &snapshot.connections {
            let Some(index) = seat_index(connection.color) else {
                continue;
            };
            self.seats[index] = if connection.is_bot {
                Seat::Bot
            } else if connection.color == snapshot.color {
                Seat::Local(connection.display_name().to_string())
            } else {
                Seat::Human(connection.display_name().to_string())
            };
        }
        self.game_id = snapshot.game_id;
        self.color = snapshot.color;
    }

    fn handle(&mut self, ctx: &mut SessionContext<'_>, intent: Intent) -> Result<(), SessionError> {
        let message = match &intent {
            Intent::StartGame => ClientMessage::StartGame,
            Intent::Seat { color, action } => {
                if color.is_spectator() || !self.seat(*color).actions().contains(action) {
                    debug!(?color, ?action, "Seat does not offer this action");
                    return Ok(());
                }
                match action {
                    SeatAction::TakeSeat => ClientMessage::SelectColor { color: *color },
                    SeatAction::LeaveSeat => ClientMessage::SelectColor {
                        color: Player::Spectator,
                    },
                    SeatAction::AddBot => ClientMessage::AddBot { color: *color },
                    SeatAction::RemoveBot => ClientMessage::RemoveBot { color: *color },
                }
            }
            _ => {
                debug!(?intent, "Ignoring intent in lobby");
                return Ok(());
            }
        };
        ctx.send(message)
    }

    fn components(&self) -> Vec<Component> {
        let mut components = vec![
            Component::GameCode(self.game_id.clone()),
            Component::BackButton,
            Component::StartButton,
        ];
        components.extend(self.seats().map(|(color, seat)| Component::Seat {
            color,
            seat: seat.clone(),
        }));
        components
    }
}

fn seat_index(color: Player) -> Option<usize> {
    Player::COLORS.iter().position(|c| *c == color)
}

// ==================== Game ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayerStatus {
    Human,
    Bot,
    Reconnecting,
}

/// A seated player as shown in the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GamePlayer {
    pub name: String,
    pub color: Player,
    pub status: PlayerStatus,
    pub is_turn: bool,
    pub is_local: bool,
}

impl GamePlayer {
    fn from_connection(
        connection: &ConnectionInfo,
        turn: Option<Player>,
        over: bool,
        local: Player,
    ) -> Self {
        let status = if connection.is_bot {
            PlayerStatus::Bot
        } else if !connection.connected {
            PlayerStatus::Reconnecting
        } else {
            PlayerStatus::Human
        };
        Self {
            name: connection.display_name().to_string(),
            color: connection.color,
            status,
            is_turn: Some(connection.color) == turn && !over,
            is_local: connection.color == local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameScreen {
    game_id: String,
    board: BoardState,
    local: Player,
    local_turn: bool,
    spectating: bool,
    roster: Vec<GamePlayer>,
    previous_move: Vec<BoardCoordinate>,
    current_move: Move,
    highlights: HashSet<BoardCoordinate>,
    game_over: bool,
    winner: Option<Player>,
}

impl Default for GameScreen {
    fn default() -> Self {
        Self {
            game_id: String::new(),
            board: BoardState::standard(),
            local: Player::Spectator,
            local_turn: false,
            spectating: false,
            roster: Vec::new(),
            previous_move: Vec::new(),
            current_move: Move::new(),
            highlights: HashSet::new(),
            game_over: false,
            winner: None,
        }
    }
}

impl GameScreen {
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn local_player(&self) -> Player {
        self.local
    }

    pub fn is_local_turn(&self) -> bool {
        self.local_turn
    }

    pub fn is_spectating(&self) -> bool {
        self.spectating
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Seated players sorted by color
    pub fn roster(&self) -> &[GamePlayer] {
        &self.roster
    }

    pub fn previous_move(&self) -> &[BoardCoordinate] {
        &self.previous_move
    }

    pub fn current_move(&self) -> &Move {
        &self.current_move
    }

    pub fn highlights(&self) -> &HashSet<BoardCoordinate> {
        &self.highlights
    }

    /// Whether clicking `coord` does anything
    pub fn is_clickable(&self, coord: BoardCoordinate) -> bool {
        self.local_turn && (self.board.get(coord) == self.local || self.highlights.contains(&coord))
    }

    fn apply(&mut self, ctx: &mut SessionContext<'_>, snapshot: GameSnapshot) {
        let turn = snapshot.current_player();
        if turn.is_none() {
            warn!(turn = snapshot.turn, "Turn index has no seat");
        }
        if snapshot.is_over() && !self.game_over {
            // The server passes the turn on before concluding, so the mover
            // is whoever held the turn in the last roster
            self.game_over = true;
            self.winner = self.roster.iter().find(|p| p.is_turn).map(|p| p.color);
            ctx.credentials.clear();
            match self.winner {
                Some(winner) => info!(%winner, "Game over"),
                None => info!("Game over, winner unknown"),
            }
        }

        self.local = snapshot.color;
        self.local_turn = turn == Some(self.local) && !self.game_over;
        self.roster = snapshot
            .connections
            .iter()
            .filter(|c| !c.color.is_spectator())
            .map(|c| GamePlayer::from_connection(c, turn, self.game_over, self.local))
            .collect();
        self.roster.sort_by_key(|p| p.color);
        self.spectating = self.roster.iter().all(|p| p.color != self.local);

        if !self.spectating && !self.game_over {
            match &snapshot.user_id {
                Some(user_id) => ctx
                    .credentials
                    .save(&Credentials::new(snapshot.game_id.clone(), user_id.clone())),
                None => warn!("Game snapshot has no user id, cannot persist credentials"),
            }
        }

        self.game_id = snapshot.game_id;
        self.board = snapshot.board;
        self.previous_move = snapshot.previous_move;
        self.current_move.clear();
        self.refresh();
    }

    fn refresh(&mut self) {
        self.highlights = legal_next(&self.board, self.local, self.local_turn, &self.current_move);
    }

    fn click(&mut self, coord: BoardCoordinate) {
        if !self.is_clickable(coord) {
            debug!(%coord, "Ignoring click on inactive cell");
            return;
        }
        if self.board.is_empty(coord) {
            if let Err(e) = self.current_move.push(coord) {
                debug!("Ignoring click: {}", e);
            }
        } else if self.current_move.origin() == Some(coord) {
            self.current_move.clear();
        } else {
            self.current_move = Move::starting_at(coord);
        }
        self.refresh();
    }

    fn handle(&mut self, ctx: &mut SessionContext<'_>, intent: Intent) -> Result<(), SessionError> {
        match intent {
            Intent::ClickCell(coord) => self.click(coord),
            Intent::ClearMove if self.local_turn && !self.current_move.is_empty() => {
                self.current_move.clear();
                self.refresh();
            }
            Intent::SubmitMove if self.local_turn => {
                let moves = self.current_move.clone();
                ctx.send(ClientMessage::MakeMove { moves })?;
                self.current_move.clear();
                self.refresh();
            }
            intent => debug!(?intent, "Ignoring intent in game"),
        }
        Ok(())
    }

    fn components(&self) -> Vec<Component> {
        let mut components = vec![
            Component::GameCode(self.game_id.clone()),
            Component::Board,
            Component::PreviousMove,
            Component::CurrentMove,
            Component::Roster,
        ];
        if self.spectating {
            components.push(Component::SpectatingBanner);
            components.push(Component::BackButton);
        }
        if self.game_over {
            if let Some(winner) = self.winner {
                components.push(Component::Winner(winner));
            }
            components.push(Component::MainMenuButton);
        } else if self.local_turn {
            components.push(Component::EndTurnButton);
            if !self.current_move.is_empty() {
                components.push(Component::ClearMoveButton);
            }
        }
        components
    }
}

// ==================== State Machine ====================

/// Live parts of the current screen, for a renderer to draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Component {
    Title,
    CreateGameButton,
    GameCodeInput,
    JoinGameButton,
    NameInput,
    NextButton,
    BackButton,
    Notice(Notice),
    GameCode(String),
    Seat { color: Player, seat: Seat },
    StartButton,
    Board,
    PreviousMove,
    CurrentMove,
    Roster,
    SpectatingBanner,
    Winner(Player),
    MainMenuButton,
    EndTurnButton,
    ClearMoveButton,
}

/// The client session
#[derive(Debug, Clone, Default)]
pub struct SessionStateMachine {
    screen: Screen,
    menu: MenuScreen,
    lobby: LobbyScreen,
    game: GameScreen,
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn menu(&self) -> &MenuScreen {
        &self.menu
    }

    pub fn lobby(&self) -> &LobbyScreen {
        &self.lobby
    }

    pub fn game(&self) -> &GameScreen {
        &self.game
    }

    /// Switch screens; re-entering the current screen keeps its state
    fn enter(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        info!(from = ?self.screen, to = ?screen, "Switching screen");
        match screen {
            Screen::Menu => self.menu.reset(),
            Screen::Lobby => self.lobby = LobbyScreen::default(),
            Screen::Game => self.game = GameScreen::default(),
        }
        self.screen = screen;
    }

    /// Called whenever the transport (re)connects.
    ///
    /// Stored credentials are offered to the server so a dropped player gets
    /// their seat back. Only the menu and a running game do this; the lobby
    /// never holds credentials of its own.
    pub fn on_connected(&mut self, ctx: &mut SessionContext<'_>) -> Result<(), SessionError> {
        if self.screen == Screen::Lobby {
            return Ok(());
        }
        let Some(credentials) = ctx.credentials.load() else {
            return Ok(());
        };
        info!(game_code = %credentials.game_code, "Resuming game");
        ctx.send(ClientMessage::ReconnectGame {
            game_id: credentials.game_code,
            user_id: credentials.user_id,
        })
    }

    /// Apply a decoded server message
    pub fn handle_message(
        &mut self,
        ctx: &mut SessionContext<'_>,
        message: ServerMessage,
    ) -> Result<(), SessionError> {
        match message {
            ServerMessage::Status(status) if status == GAME_DOES_NOT_EXIST => {
                info!("Server does not know the requested game");
                self.enter(Screen::Menu);
                self.menu.notice = Some(Notice::InvalidGameCode);
                ctx.credentials.clear();
                return Err(SessionError::UnknownOrExpiredGame);
            }
            ServerMessage::Status(status) => debug!(%status, "Server status"),
            ServerMessage::Snapshot(Snapshot::Lobby(snapshot)) => {
                self.enter(Screen::Lobby);
                self.lobby.apply(snapshot);
            }
            ServerMessage::Snapshot(Snapshot::Game(snapshot)) => {
                self.enter(Screen::Game);
                self.game.apply(ctx, snapshot);
            }
        }
        Ok(())
    }

    /// Decode and apply a raw server message; undecodable text is dropped
    pub fn handle_text(
        &mut self,
        ctx: &mut SessionContext<'_>,
        text: &str,
    ) -> Result<(), SessionError> {
        match ServerMessage::parse(text) {
            Ok(message) => self.handle_message(ctx, message),
            Err(e) => {
                warn!("Dropping server message: {}", e);
                Ok(())
            }
        }
    }

    /// Apply a user intent to the current screen
    pub fn handle_intent(
        &mut self,
        ctx: &mut SessionContext<'_>,
        intent: Intent,
    ) -> Result<(), SessionError> {
        match (self.screen, intent) {
            (Screen::Lobby, Intent::Back) => self.leave(ctx),
            (Screen::Game, Intent::Back) if self.game.spectating => self.leave(ctx),
            (Screen::Game, Intent::MainMenu) if self.game.game_over => self.leave(ctx),
            (Screen::Menu, intent) => return self.menu.handle(ctx, intent),
            (Screen::Lobby, intent) => return self.lobby.handle(ctx, intent),
            (Screen::Game, intent) => return self.game.handle(ctx, intent),
        }
        Ok(())
    }

    fn leave(&mut self, ctx: &mut SessionContext<'_>) {
        ctx.abandon();
        self.enter(Screen::Menu);
    }

    /// Components of the current screen
    pub fn active_components(&self) -> Vec<Component> {
        match self.screen {
            Screen::Menu => self.menu.components(),
            Screen::Lobby => self.lobby.components(),
            Screen::Game => self.game.components(),
        }
    }
}
