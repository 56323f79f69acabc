//! Player colors and their home regions.
//!
//! A cell of the board is occupied by one of six colors or by nobody; the
//! same enum doubles as the "spectator" seat in the lobby, which is why the
//! empty value is called [`Player::Spectator`].

use crate::coord::BoardCoordinate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw player values outside `0..=6`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unknown player value {0}")]
pub struct UnknownPlayer(pub u8);

/// A seat color, or nobody.
///
/// Serialized as its integer value (`0` = spectator / empty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Player {
    /// Empty cell, or a connection that has not taken a seat
    #[default]
    Spectator,
    Red,
    Blue,
    Yellow,
    Green,
    Orange,
    Purple,
}

/// Home cells of each color, as `(col, row)` pairs
const HOMES: [[(i32, i32); 10]; 6] = [
    // Red
    [(4, 0), (4, 1), (4, 2), (4, 3), (5, 1), (5, 2), (5, 3), (6, 2), (6, 3), (7, 3)],
    // Blue
    [(0, 4), (1, 4), (1, 5), (2, 4), (2, 5), (2, 6), (3, 4), (3, 5), (3, 6), (3, 7)],
    // Yellow
    [(4, 9), (4, 10), (4, 11), (4, 12), (5, 10), (5, 11), (5, 12), (6, 11), (6, 12), (7, 12)],
    // Green
    [(9, 13), (10, 13), (10, 14), (11, 13), (11, 14), (11, 15), (12, 13), (12, 14), (12, 15), (12, 16)],
    // Orange
    [(13, 9), (13, 10), (13, 11), (13, 12), (14, 10), (14, 11), (14, 12), (15, 11), (15, 12), (16, 12)],
    // Purple
    [(9, 4), (10, 4), (10, 5), (11, 4), (11, 5), (11, 6), (12, 4), (12, 5), (12, 6), (12, 7)],
];

impl Player {
    /// The six playing colors in seat order
    pub const COLORS: [Player; 6] = [
        Player::Red,
        Player::Blue,
        Player::Yellow,
        Player::Green,
        Player::Orange,
        Player::Purple,
    ];

    pub fn is_spectator(&self) -> bool {
        *self == Player::Spectator
    }

    /// The color whose home region faces this one
    pub fn opposite(&self) -> Player {
        match self {
            Player::Spectator => Player::Spectator,
            Player::Red => Player::Green,
            Player::Blue => Player::Orange,
            Player::Yellow => Player::Purple,
            Player::Green => Player::Red,
            Player::Orange => Player::Blue,
            Player::Purple => Player::Yellow,
        }
    }

    /// The ten cells initially holding this color's pieces (none for spectators)
    pub fn home(&self) -> Vec<BoardCoordinate> {
        let index = u8::from(*self);
        if index == 0 {
            return Vec::new();
        }
        HOMES[usize::from(index - 1)]
            .iter()
            .filter_map(|&(col, row)| BoardCoordinate::new(col, row).ok())
            .collect()
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Player::Spectator => "Spectator",
            Player::Red => "Red",
            Player::Blue => "Blue",
            Player::Yellow => "Yellow",
            Player::Green => "Green",
            Player::Orange => "Orange",
            Player::Purple => "Purple",
        }
    }

    /// Hex color code for rendering
    pub fn hex_code(&self) -> u32 {
        match self {
            Player::Spectator => 0xF5F5F5,
            Player::Red => 0xFD82A1,
            Player::Blue => 0x78DCE8,
            Player::Yellow => 0xFFD866,
            Player::Green => 0xA9DC76,
            Player::Orange => 0xFC9867,
            Player::Purple => 0xAB9DF2,
        }
    }
}

impl TryFrom<u8> for Player {
    type Error = UnknownPlayer;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Player::Spectator),
            1 => Ok(Player::Red),
            2 => Ok(Player::Blue),
            3 => Ok(Player::Yellow),
            4 => Ok(Player::Green),
            5 => Ok(Player::Orange),
            6 => Ok(Player::Purple),
            other => Err(UnknownPlayer(other)),
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        match player {
            Player::Spectator => 0,
            Player::Red => 1,
            Player::Blue => 2,
            Player::Yellow => 3,
            Player::Green => 4,
            Player::Orange => 5,
            Player::Purple => 6,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
