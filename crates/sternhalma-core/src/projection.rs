//! Mapping from board coordinates to screen space.
//!
//! Rows are laid out top to bottom; each row is shifted left by half a cell
//! per two rows so that the skewed grid of [`crate::coord`] renders as a
//! regular hexagonal star.

use crate::coord::BoardCoordinate;
use crate::vector::{Vector, VectorError};

/// Diameter of a drawn cell, in pixels
pub const CIR_DIAMETER: f64 = 30.0;
/// Horizontal gap between cells
pub const CIR_H_PADDING: f64 = 12.0;
/// Vertical gap between rows
pub const CIR_V_PADDING: f64 = 7.0;
/// Left margin of the board
pub const BOARD_H_PADDING: f64 = 148.0;
/// Top margin of the board
pub const BOARD_V_PADDING: f64 = 100.0;

/// Length of an arrow head on the move overlay
const ARROW_HEAD_LENGTH: f64 = 8.5;

/// Screen-space centre of a cell
pub fn project(coord: BoardCoordinate) -> Vector {
    let col = f64::from(coord.col());
    let row = coord.row();
    let shift = if row % 2 == 0 { 2.0 } else { 1.5 };
    let offset = -f64::from(row.div_euclid(2)) + shift;
    Vector::new(
        (col + offset) * (CIR_DIAMETER + CIR_H_PADDING) + BOARD_H_PADDING,
        f64::from(row) * (CIR_DIAMETER + CIR_V_PADDING) + BOARD_V_PADDING,
    )
}

/// Triangle drawn halfway along the segment `from -> to`, pointing at `to`
pub fn arrow_head(from: Vector, to: Vector) -> Result<[Vector; 3], VectorError> {
    let midpoint = from.add(to).divide(2.0)?;
    let tip = to.subtract(from).norm()?.multiply(ARROW_HEAD_LENGTH);
    let base = midpoint.add(tip.divide(5.0)?);
    Ok([
        base.add(tip),
        base.add(tip.rotate(135.0)),
        base.add(tip.rotate(-135.0)),
    ])
}

/// One arrow head per step of `path`, in screen space
pub fn path_arrow_heads(path: &[BoardCoordinate]) -> Vec<[Vector; 3]> {
    path.windows(2)
        .filter_map(|pair| arrow_head(project(pair[0]), project(pair[1])).ok())
        .collect()
}
