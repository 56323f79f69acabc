//! WebAssembly bindings for the Sternhalma client core.
//!
//! JavaScript owns the websocket and the cookies. It feeds inbound text and
//! connection changes in, then drains the outbox and mirrors the stored
//! credentials after every call.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use crate::coord::BoardCoordinate;
#[cfg(feature = "wasm")]
use crate::credentials::{CredentialStore, Credentials, MemoryCredentialStore};
#[cfg(feature = "wasm")]
use crate::player::Player;
#[cfg(feature = "wasm")]
use crate::projection::{path_arrow_heads, project};
#[cfg(feature = "wasm")]
use crate::session::{Intent, SeatAction, SessionContext, SessionError, SessionStateMachine};
#[cfg(feature = "wasm")]
use crate::transport::{OutboxTransport, Transport};

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[cfg(feature = "wasm")]
fn to_js(error: SessionError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// WASM-exposed session wrapper
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct WasmClient {
    session: SessionStateMachine,
    transport: OutboxTransport,
    credentials: MemoryCredentialStore,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl WasmClient {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmClient {
        WasmClient {
            session: SessionStateMachine::new(),
            transport: OutboxTransport::new(false),
            credentials: MemoryCredentialStore::new(),
        }
    }

    /// Report a change of socket state; opening sends a pending reconnect
    #[wasm_bindgen(js_name = setConnected)]
    pub fn set_connected(&mut self, connected: bool) -> Result<(), JsValue> {
        let opened = connected && !self.transport.is_connected();
        self.transport.set_connected(connected);
        if opened {
            let mut ctx = SessionContext::new(&mut self.transport, &mut self.credentials);
            self.session.on_connected(&mut ctx).map_err(to_js)?;
        }
        Ok(())
    }

    /// Seed the store from cookies at startup
    #[wasm_bindgen(js_name = setCredentials)]
    pub fn set_credentials(&mut self, game_code: &str, user_id: &str) {
        self.credentials.save(&Credentials::new(game_code, user_id));
    }

    /// Stored credentials as JSON, or `null`
    #[wasm_bindgen(js_name = getCredentials)]
    pub fn get_credentials(&self) -> String {
        serde_json::to_string(&self.credentials.load()).unwrap_or_else(|_| "null".to_string())
    }

    /// Feed one inbound websocket message
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&mut self, text: &str) -> Result<(), JsValue> {
        let mut ctx = SessionContext::new(&mut self.transport, &mut self.credentials);
        self.session.handle_text(&mut ctx, text).map_err(to_js)
    }

    /// Take queued outbound messages as a JSON array
    #[wasm_bindgen(js_name = drainOutbox)]
    pub fn drain_outbox(&mut self) -> String {
        serde_json::to_string(&self.transport.drain()).unwrap_or_else(|_| "[]".to_string())
    }

    /// How many times the session has asked for the socket to be closed
    #[wasm_bindgen(js_name = disconnectCount)]
    pub fn disconnect_count(&self) -> u32 {
        self.transport.disconnects()
    }

    #[wasm_bindgen(js_name = createGame)]
    pub fn create_game(&mut self) -> Result<(), JsValue> {
        self.intent(Intent::CreateGame)
    }

    #[wasm_bindgen(js_name = joinGame)]
    pub fn join_game(&mut self, code: String) -> Result<(), JsValue> {
        self.intent(Intent::JoinGame { code })
    }

    #[wasm_bindgen(js_name = submitName)]
    pub fn submit_name(&mut self, name: String) -> Result<(), JsValue> {
        self.intent(Intent::SubmitName { name })
    }

    /// Act on a lobby seat; `action` is one of "TakeSeat", "AddBot",
    /// "RemoveBot" or "LeaveSeat"
    #[wasm_bindgen(js_name = seatAction)]
    pub fn seat_action(&mut self, color: u8, action: &str) -> Result<(), JsValue> {
        let color = Player::try_from(color).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let action: SeatAction = serde_json::from_value(serde_json::Value::from(action))
            .map_err(|e| JsValue::from_str(&format!("Invalid seat action: {}", e)))?;
        self.intent(Intent::Seat { color, action })
    }

    #[wasm_bindgen(js_name = startGame)]
    pub fn start_game(&mut self) -> Result<(), JsValue> {
        self.intent(Intent::StartGame)
    }

    #[wasm_bindgen(js_name = clickCell)]
    pub fn click_cell(&mut self, col: i32, row: i32) -> Result<(), JsValue> {
        let coord =
            BoardCoordinate::new(col, row).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.intent(Intent::ClickCell(coord))
    }

    #[wasm_bindgen(js_name = clearMove)]
    pub fn clear_move(&mut self) -> Result<(), JsValue> {
        self.intent(Intent::ClearMove)
    }

    #[wasm_bindgen(js_name = submitMove)]
    pub fn submit_move(&mut self) -> Result<(), JsValue> {
        self.intent(Intent::SubmitMove)
    }

    #[wasm_bindgen(js_name = mainMenu)]
    pub fn main_menu(&mut self) -> Result<(), JsValue> {
        self.intent(Intent::MainMenu)
    }

    pub fn back(&mut self) -> Result<(), JsValue> {
        self.intent(Intent::Back)
    }

    /// Current screen name
    #[wasm_bindgen(js_name = getScreen)]
    pub fn get_screen(&self) -> String {
        format!("{:?}", self.session.screen())
    }

    /// Live components of the current screen as JSON
    #[wasm_bindgen(js_name = getComponents)]
    pub fn get_components(&self) -> String {
        serde_json::to_string(&self.session.active_components())
            .unwrap_or_else(|_| "[]".to_string())
    }

    /// Board with the in-progress move applied, as a `[col][row]` grid
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> String {
        let game = self.session.game();
        let board = game.board().with_path_preview(game.current_move().path());
        serde_json::to_string(&board).unwrap_or_else(|_| "[]".to_string())
    }

    /// Cells that can be clicked, as `[[col, row], ...]`
    #[wasm_bindgen(js_name = getClickable)]
    pub fn get_clickable(&self) -> String {
        let game = self.session.game();
        let cells: Vec<BoardCoordinate> = BoardCoordinate::all()
            .filter(|c| game.is_clickable(*c))
            .collect();
        serde_json::to_string(&cells).unwrap_or_else(|_| "[]".to_string())
    }

    /// Highlighted next cells, as `[[col, row], ...]`
    #[wasm_bindgen(js_name = getHighlights)]
    pub fn get_highlights(&self) -> String {
        let mut cells: Vec<&BoardCoordinate> = self.session.game().highlights().iter().collect();
        cells.sort();
        serde_json::to_string(&cells).unwrap_or_else(|_| "[]".to_string())
    }

    /// The in-progress move and the previous move, for the arrow overlays
    #[wasm_bindgen(js_name = getMoves)]
    pub fn get_moves(&self) -> String {
        let game = self.session.game();
        let moves = serde_json::json!({
            "current": game.current_move(),
            "previous": game.previous_move(),
        });
        moves.to_string()
    }

    /// Roster of the running game as JSON
    #[wasm_bindgen(js_name = getRoster)]
    pub fn get_roster(&self) -> String {
        serde_json::to_string(self.session.game().roster()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Arrow-head triangles for every step of the previous and current moves,
    /// as `{"previous": [[[x, y], [x, y], [x, y]], ...], "current": [...]}`
    #[wasm_bindgen(js_name = getArrowHeads)]
    pub fn get_arrow_heads(&self) -> String {
        let game = self.session.game();
        let arrows = serde_json::json!({
            "previous": path_arrow_heads(game.previous_move()),
            "current": path_arrow_heads(game.current_move().path()),
        });
        arrows.to_string()
    }

    /// Rendering color of a player value as `0xRRGGBB`
    #[wasm_bindgen(js_name = playerColor)]
    pub fn player_color(player: u8) -> Result<u32, JsValue> {
        let player = Player::try_from(player).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(player.hex_code())
    }

    /// Screen position of a cell as `[x, y]`
    #[wasm_bindgen(js_name = projectCell)]
    pub fn project_cell(col: i32, row: i32) -> Result<Vec<f64>, JsValue> {
        let coord =
            BoardCoordinate::new(col, row).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let point = project(coord);
        Ok(vec![point.x, point.y])
    }
}

#[cfg(feature = "wasm")]
impl WasmClient {
    fn intent(&mut self, intent: Intent) -> Result<(), JsValue> {
        let mut ctx = SessionContext::new(&mut self.transport, &mut self.credentials);
        self.session.handle_intent(&mut ctx, intent).map_err(to_js)
    }
}

#[cfg(feature = "wasm")]
impl Default for WasmClient {
    fn default() -> Self {
        Self::new()
    }
}
