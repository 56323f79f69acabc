//! Logical coordinates on the star board.
//!
//! The board is a 17x17 grid of which only 121 cells exist: a central hexagon
//! with six triangular arms. Each column `col` owns the half-open row range
//! `[low, high)` from [`LIMITS`]. A [`BoardCoordinate`] can only be built for a
//! cell inside that shape, so code holding one never needs a bounds check.
//!
//! Adjacency is expressed with six [`Direction`]s. In this skewed layout the
//! neighbours of `(c, r)` are `(c±1, r)`, `(c, r±1)`, `(c-1, r-1)` and
//! `(c+1, r+1)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width and height of the underlying grid
pub const BOARD_SIZE: usize = 17;

/// Number of cells inside the star shape
pub const CELL_COUNT: usize = 121;

/// Half-open row range `[low, high)` of every column
pub const LIMITS: [[i32; 2]; BOARD_SIZE] = [
    [4, 5],
    [4, 6],
    [4, 7],
    [4, 8],
    [0, 13],
    [1, 13],
    [2, 13],
    [3, 13],
    [4, 13],
    [4, 14],
    [4, 15],
    [4, 16],
    [4, 17],
    [9, 13],
    [10, 13],
    [11, 13],
    [12, 13],
];

/// Errors from building coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoordError {
    #[error("Invalid coordinate ({col}, {row})")]
    InvalidCoordinate { col: i32, row: i32 },
}

/// One of the six hex adjacency directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `(-1, -1)`
    UpLeft,
    /// `(-1, 0)`
    Left,
    /// `(0, -1)`
    Up,
    /// `(0, 1)`
    Down,
    /// `(1, 0)`
    Right,
    /// `(1, 1)`
    DownRight,
}

impl Direction {
    /// All six directions
    pub const ALL: [Direction; 6] = [
        Direction::UpLeft,
        Direction::Left,
        Direction::Up,
        Direction::Down,
        Direction::Right,
        Direction::DownRight,
    ];

    /// Offset in `(col, row)` space
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::UpLeft => (-1, -1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Right => (1, 0),
            Direction::DownRight => (1, 1),
        }
    }

    /// The direction whose offset equals `(dc, dr)`, if any
    pub fn from_offset(dc: i32, dr: i32) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.offset() == (dc, dr))
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::UpLeft => Direction::DownRight,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Right => Direction::Left,
            Direction::DownRight => Direction::UpLeft,
        }
    }
}

/// A validated cell of the star board.
///
/// On the wire a coordinate is the pair `[col, row]`; decoding validates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "[i32; 2]", into = "[i32; 2]")]
pub struct BoardCoordinate {
    col: i32,
    row: i32,
}

impl BoardCoordinate {
    /// Create a coordinate, failing unless `(col, row)` lies on the board
    pub fn new(col: i32, row: i32) -> Result<Self, CoordError> {
        if Self::is_valid(col, row) {
            Ok(Self { col, row })
        } else {
            Err(CoordError::InvalidCoordinate { col, row })
        }
    }

    /// Whether `(col, row)` lies inside the star shape
    pub fn is_valid(col: i32, row: i32) -> bool {
        if !(0..BOARD_SIZE as i32).contains(&col) {
            return false;
        }
        let [low, high] = LIMITS[col as usize];
        (low..high).contains(&row)
    }

    pub const fn col(&self) -> i32 {
        self.col
    }

    pub const fn row(&self) -> i32 {
        self.row
    }

    /// The neighbouring cell in `direction`, or `None` off the board
    pub fn offset(&self, direction: Direction) -> Option<BoardCoordinate> {
        let (dc, dr) = direction.offset();
        Self::new(self.col + dc, self.row + dr).ok()
    }

    /// All on-board neighbours
    pub fn neighbors(&self) -> Vec<BoardCoordinate> {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.offset(d))
            .collect()
    }

    /// Direction of a single step from `self` to `other`, if they are adjacent
    pub fn direction_to(&self, other: &BoardCoordinate) -> Option<Direction> {
        Direction::from_offset(other.col - self.col, other.row - self.row)
    }

    /// Every valid coordinate in column-major order
    pub fn all() -> impl Iterator<Item = BoardCoordinate> {
        LIMITS.iter().enumerate().flat_map(|(col, [low, high])| {
            (*low..*high).map(move |row| BoardCoordinate {
                col: col as i32,
                row,
            })
        })
    }
}

impl TryFrom<[i32; 2]> for BoardCoordinate {
    type Error = CoordError;

    fn try_from([col, row]: [i32; 2]) -> Result<Self, Self::Error> {
        Self::new(col, row)
    }
}

impl From<BoardCoordinate> for [i32; 2] {
    fn from(coord: BoardCoordinate) -> Self {
        [coord.col, coord.row]
    }
}

impl std::fmt::Display for BoardCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}
