//! In-progress moves and the highlight engine.
//!
//! A turn moves one piece either a single step into an adjacent empty cell,
//! or along a chain of jumps, each hopping over an occupied neighbour onto the
//! empty cell directly behind it. The client builds that path one click at a
//! time; [`legal_next`] tells the UI which cells may be clicked next.
//!
//! None of this is authoritative. The server re-validates every submitted
//! move, so a wrong answer here only produces a wrong highlight.

use crate::board::BoardState;
use crate::coord::{BoardCoordinate, Direction};
use crate::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors from extending a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Cell {0} is already part of the move")]
    AlreadyVisited(BoardCoordinate),
}

/// The path of a piece for the current turn.
///
/// The first coordinate is the piece's origin. A coordinate never appears
/// twice. Serialized as a list of `[col, row]` pairs; decoding rejects
/// repeated cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<BoardCoordinate>", into = "Vec<BoardCoordinate>")]
pub struct Move {
    path: Vec<BoardCoordinate>,
}

impl Move {
    /// An empty move
    pub fn new() -> Self {
        Self::default()
    }

    /// A move starting at `origin`
    pub fn starting_at(origin: BoardCoordinate) -> Self {
        Self { path: vec![origin] }
    }

    /// Build a move from a path, rejecting repeated cells
    pub fn from_path(path: Vec<BoardCoordinate>) -> Result<Self, MoveError> {
        let mut mv = Self::new();
        for coord in path {
            mv.push(coord)?;
        }
        Ok(mv)
    }

    /// Append a cell to the path
    pub fn push(&mut self, coord: BoardCoordinate) -> Result<(), MoveError> {
        if self.contains(&coord) {
            return Err(MoveError::AlreadyVisited(coord));
        }
        self.path.push(coord);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.path.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn contains(&self, coord: &BoardCoordinate) -> bool {
        self.path.contains(coord)
    }

    /// Where the piece started
    pub fn origin(&self) -> Option<BoardCoordinate> {
        self.path.first().copied()
    }

    /// Where the piece currently is
    pub fn last(&self) -> Option<BoardCoordinate> {
        self.path.last().copied()
    }

    pub fn path(&self) -> &[BoardCoordinate] {
        &self.path
    }

    /// Whether the move so far is a single plain step
    fn is_plain_step(&self) -> bool {
        match self.path.as_slice() {
            [from, to] => from.direction_to(to).is_some(),
            _ => false,
        }
    }
}

impl TryFrom<Vec<BoardCoordinate>> for Move {
    type Error = MoveError;

    fn try_from(path: Vec<BoardCoordinate>) -> Result<Self, Self::Error> {
        Self::from_path(path)
    }
}

impl From<Move> for Vec<BoardCoordinate> {
    fn from(mv: Move) -> Self {
        mv.path
    }
}

/// Cells that may legally be appended to `mv`.
///
/// Empty unless it is `local`'s turn and a piece has been picked. From the
/// last cell of the path, each direction contributes at most one cell:
///
/// * an empty neighbour, if the path is still at the piece's origin;
/// * the empty cell behind an occupied neighbour (a jump), unless the path is
///   exactly one plain step long.
///
/// Cells already on the path are never returned. Only the length-two plain
/// step is treated as final; longer paths are checked cell by cell.
pub fn legal_next(
    board: &BoardState,
    local: Player,
    is_turn: bool,
    mv: &Move,
) -> HashSet<BoardCoordinate> {
    let mut legal = HashSet::new();
    if !is_turn {
        return legal;
    }
    let Some(start) = mv.last() else {
        return legal;
    };
    let at_origin = board.get(start) == local;

    for direction in Direction::ALL {
        let Some(neighbor) = start.offset(direction) else {
            continue;
        };

        if board.is_empty(neighbor) {
            if at_origin && !mv.contains(&neighbor) {
                legal.insert(neighbor);
            }
            continue;
        }

        if mv.is_plain_step() {
            continue;
        }
        if let Some(landing) = neighbor.offset(direction) {
            if board.is_empty(landing) && !mv.contains(&landing) {
                legal.insert(landing);
            }
        }
    }

    legal
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn coord(col: i32, row: i32) -> BoardCoordinate {
        BoardCoordinate::new(col, row).unwrap()
    }

    fn set(cells: &[(i32, i32)]) -> HashSet<BoardCoordinate> {
        cells.iter().map(|&(c, r)| coord(c, r)).collect()
    }

    fn board_with(pieces: &[(i32, i32, Player)]) -> BoardState {
        let mut grid = vec![vec![Player::Spectator; 17]; 17];
        for &(col, row, player) in pieces {
            grid[col as usize][row as usize] = player;
        }
        BoardState::from_grid(grid).unwrap()
    }

    #[test]
    fn test_move_rejects_revisits() {
        let mut mv = Move::starting_at(coord(8, 8));
        mv.push(coord(8, 10)).unwrap();
        assert_eq!(mv.push(coord(8, 8)), Err(MoveError::AlreadyVisited(coord(8, 8))));
        assert_eq!(mv.len(), 2);

        assert!(Move::from_path(vec![coord(8, 8), coord(8, 8)]).is_err());
    }

    #[test]
    fn test_move_wire_form() {
        let mv = Move::from_path(vec![coord(7, 3), coord(7, 4)]).unwrap();
        assert_eq!(serde_json::to_string(&mv).unwrap(), "[[7,3],[7,4]]");
        assert_eq!(serde_json::from_str::<Move>("[[7,3],[7,4]]").unwrap(), mv);
    }

    #[test]
    fn test_decoding_rejects_repeated_cells() {
        assert!(serde_json::from_str::<Move>("[[7,3],[7,3]]").is_err());
        assert!(serde_json::from_str::<Move>("[[8,8],[8,10],[8,8]]").is_err());

        let submitted = r#"{"type": "move", "moves": [[7, 3], [7, 4], [7, 3]]}"#;
        assert!(serde_json::from_str::<crate::protocol::ClientMessage>(submitted).is_err());
    }

    #[test]
    fn test_nothing_when_not_my_turn_or_no_piece() {
        let board = BoardState::standard();
        let mv = Move::starting_at(coord(7, 3));
        assert!(legal_next(&board, Player::Red, false, &mv).is_empty());
        assert!(legal_next(&board, Player::Red, true, &Move::new()).is_empty());
    }

    #[test]
    fn test_plain_steps_from_origin() {
        let board = board_with(&[(8, 8, Player::Red)]);
        let mv = Move::starting_at(coord(8, 8));
        let legal = legal_next(&board, Player::Red, true, &mv);
        assert_eq!(
            legal,
            set(&[(7, 7), (7, 8), (8, 7), (8, 9), (9, 8), (9, 9)])
        );
    }

    #[test]
    fn test_no_steps_from_someone_elses_piece() {
        let board = board_with(&[(8, 8, Player::Blue)]);
        let mv = Move::starting_at(coord(8, 8));
        assert!(legal_next(&board, Player::Red, true, &mv).is_empty());
    }

    #[test]
    fn test_jump_over_any_occupied_cell() {
        let board = board_with(&[(8, 8, Player::Red), (9, 8, Player::Blue), (8, 9, Player::Red)]);
        let mv = Move::starting_at(coord(8, 8));
        let legal = legal_next(&board, Player::Red, true, &mv);

        assert!(legal.contains(&coord(10, 8)));
        assert!(legal.contains(&coord(8, 10)));
        assert!(!legal.contains(&coord(9, 8)));
        assert!(!legal.contains(&coord(8, 9)));
    }

    #[test]
    fn test_jump_needs_empty_landing() {
        let board = board_with(&[(8, 8, Player::Red), (9, 8, Player::Blue), (10, 8, Player::Green)]);
        let mv = Move::starting_at(coord(8, 8));
        let legal = legal_next(&board, Player::Red, true, &mv);
        assert!(!legal.contains(&coord(10, 8)));
    }

    #[test]
    fn test_jumps_from_arm_tip() {
        // Only two of the six directions stay on the board from (4, 0)
        let board = board_with(&[(4, 0, Player::Red), (4, 1, Player::Red), (5, 1, Player::Red)]);
        let mv = Move::starting_at(coord(4, 0));
        let legal = legal_next(&board, Player::Red, true, &mv);
        assert_eq!(legal, set(&[(4, 2), (6, 2)]));
    }

    #[test]
    fn test_chain_continues_only_with_jumps() {
        // Red jumped from (8, 8) over (9, 8) to (10, 8); the path no longer
        // sits on a red piece, so plain steps are over.
        let board = board_with(&[(8, 8, Player::Red), (9, 8, Player::Blue), (11, 9, Player::Blue)]);
        let mv = Move::from_path(vec![coord(8, 8), coord(10, 8)]).unwrap();
        let legal = legal_next(&board, Player::Red, true, &mv);
        assert_eq!(legal, set(&[(12, 10)]));
    }

    #[test]
    fn test_chain_never_revisits() {
        // (8, 8) -> (10, 8) -> (10, 10); hopping back up over (10, 9) would
        // land on (10, 8), which is empty but already on the path.
        let board = board_with(&[(8, 8, Player::Red), (9, 8, Player::Blue), (10, 9, Player::Blue)]);
        let mv = Move::from_path(vec![coord(8, 8), coord(10, 8), coord(10, 10)]).unwrap();
        assert!(board.is_empty(coord(10, 8)));
        assert!(legal_next(&board, Player::Red, true, &mv).is_empty());
    }

    #[test]
    fn test_plain_step_ends_the_move() {
        let board = board_with(&[(8, 8, Player::Red), (9, 9, Player::Blue), (8, 10, Player::Blue)]);
        let mv = Move::from_path(vec![coord(8, 8), coord(8, 9)]).unwrap();
        assert!(legal_next(&board, Player::Red, true, &mv).is_empty());
    }

    #[test]
    fn test_repeated_calls_agree() {
        let board = BoardState::standard();
        let mv = Move::starting_at(coord(7, 3));
        let first = legal_next(&board, Player::Red, true, &mv);
        for _ in 0..5 {
            assert_eq!(legal_next(&board, Player::Red, true, &mv), first);
        }
    }
}
