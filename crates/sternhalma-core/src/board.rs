//! Board occupancy.
//!
//! `BoardState` maps every valid [`BoardCoordinate`] to a [`Player`]. The
//! client never edits it cell by cell: it is built from the home regions when
//! a screen is created and then replaced wholesale by every server snapshot.
//! On the wire a board is a 17x17 grid indexed `[col][row]`.

use crate::coord::{BoardCoordinate, BOARD_SIZE};
use crate::player::Player;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from decoding a board grid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Board must have 17 columns, got {0}")]
    WrongColumnCount(usize),

    #[error("Column {col} must have 17 cells, got {len}")]
    WrongColumnLength { col: usize, len: usize },
}

/// Occupancy of every cell on the star board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Player>>", into = "Vec<Vec<Player>>")]
pub struct BoardState {
    cells: [[Player; BOARD_SIZE]; BOARD_SIZE],
}

impl BoardState {
    /// A board with no pieces at all
    pub fn empty() -> Self {
        Self {
            cells: [[Player::Spectator; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// The opening position with all six home regions filled
    pub fn standard() -> Self {
        Self::with_players(&Player::COLORS)
    }

    /// The opening position with only `players` seated
    pub fn with_players(players: &[Player]) -> Self {
        let mut board = Self::empty();
        for player in players {
            for cell in player.home() {
                board.set(cell, *player);
            }
        }
        board
    }

    /// Build a board from a `[col][row]` grid.
    ///
    /// Values outside the star shape are ignored.
    pub fn from_grid(grid: Vec<Vec<Player>>) -> Result<Self, BoardError> {
        if grid.len() != BOARD_SIZE {
            return Err(BoardError::WrongColumnCount(grid.len()));
        }
        let mut board = Self::empty();
        for (col, column) in grid.iter().enumerate() {
            if column.len() != BOARD_SIZE {
                return Err(BoardError::WrongColumnLength {
                    col,
                    len: column.len(),
                });
            }
        }
        for coord in BoardCoordinate::all() {
            board.set(coord, grid[coord.col() as usize][coord.row() as usize]);
        }
        Ok(board)
    }

    /// The `[col][row]` grid, with empty cells outside the star
    pub fn to_grid(&self) -> Vec<Vec<Player>> {
        self.cells.iter().map(|column| column.to_vec()).collect()
    }

    /// Occupant of a cell
    pub fn get(&self, coord: BoardCoordinate) -> Player {
        self.cells[coord.col() as usize][coord.row() as usize]
    }

    pub fn is_empty(&self, coord: BoardCoordinate) -> bool {
        self.get(coord).is_spectator()
    }

    fn set(&mut self, coord: BoardCoordinate, player: Player) {
        self.cells[coord.col() as usize][coord.row() as usize] = player;
    }

    /// All cells with their occupants, in column-major order
    pub fn iter(&self) -> impl Iterator<Item = (BoardCoordinate, Player)> + '_ {
        BoardCoordinate::all().map(move |coord| (coord, self.get(coord)))
    }

    /// Cells holding `player`'s pieces
    pub fn pieces_of(&self, player: Player) -> Vec<BoardCoordinate> {
        if player.is_spectator() {
            return Vec::new();
        }
        self.iter()
            .filter(|(_, occupant)| *occupant == player)
            .map(|(coord, _)| coord)
            .collect()
    }

    /// Copy of the board with the piece at the start of `path` shown at its end.
    ///
    /// Used to preview an in-progress move; the original board is untouched.
    pub fn with_path_preview(&self, path: &[BoardCoordinate]) -> BoardState {
        let mut preview = self.clone();
        if let (Some(&from), Some(&to)) = (path.first(), path.last()) {
            if from != to {
                let piece = preview.get(from);
                preview.set(from, Player::Spectator);
                preview.set(to, piece);
            }
        }
        preview
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<Vec<Player>>> for BoardState {
    type Error = BoardError;

    fn try_from(grid: Vec<Vec<Player>>) -> Result<Self, Self::Error> {
        Self::from_grid(grid)
    }
}

impl From<BoardState> for Vec<Vec<Player>> {
    fn from(board: BoardState) -> Self {
        board.to_grid()
    }
}
