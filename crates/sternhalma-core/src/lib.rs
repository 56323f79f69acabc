//! Sternhalma - client core for online Chinese checkers
//!
//! This crate provides the client-side logic of the game, including:
//! - The star-shaped board coordinate system and its screen projection
//! - The highlight engine that suggests legal next cells for a move
//! - The session state machine that follows server snapshots across the
//!   menu, lobby and game screens
//!
//! # Architecture
//!
//! The server decides what is legal and who wins; this crate only mirrors its
//! snapshots and turns user intents into requests. The core never does I/O
//! itself: a [`Transport`] and a [`CredentialStore`] are passed into every
//! session call. It can be compiled to:
//! - Native Rust, driven by the `sternhalma-client` binary
//! - WebAssembly (feature `wasm`), driven from the browser
//!
//! # Modules
//!
//! - [`vector`]: 2-D vector arithmetic
//! - [`coord`]: Board coordinates and hex directions
//! - [`projection`]: Board to screen projection
//! - [`player`]: Player colors and home regions
//! - [`board`]: Board occupancy
//! - [`moves`]: In-progress moves and legal next cells
//! - [`protocol`]: Server wire messages
//! - [`session`]: Session state machine

pub mod board;
pub mod coord;
pub mod credentials;
pub mod moves;
pub mod player;
pub mod projection;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod vector;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use board::{BoardError, BoardState};
pub use coord::{BoardCoordinate, CoordError, Direction};
pub use credentials::{CredentialStore, Credentials, MemoryCredentialStore};
pub use moves::{legal_next, Move, MoveError};
pub use player::Player;
pub use projection::{arrow_head, path_arrow_heads, project};
pub use protocol::{ClientMessage, ProtocolError, ServerMessage, Snapshot};
pub use session::{
    Component, Intent, Screen, SeatAction, SessionContext, SessionError, SessionStateMachine,
};
pub use transport::{ConnectionStatus, OutboxTransport, ReconnectPolicy, Transport};
pub use vector::{Vector, VectorError};
