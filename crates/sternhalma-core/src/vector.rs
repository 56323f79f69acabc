//! Two-dimensional vector arithmetic.
//!
//! `Vector` is used both for screen-space positions produced by the
//! [`projection`](crate::projection) module and for arrow geometry on the
//! move overlay. Every operation returns a new value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from vector arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VectorError {
    #[error("Division by zero is not allowed")]
    DivisionByZero,
}

/// An immutable `(x, y)` pair of reals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    /// The zero vector
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    /// Create a new vector
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }

    /// Scale by a scalar
    pub fn multiply(&self, scalar: f64) -> Vector {
        Vector::new(self.x * scalar, self.y * scalar)
    }

    /// Divide by a scalar, failing when the scalar is exactly zero
    pub fn divide(&self, scalar: f64) -> Result<Vector, VectorError> {
        if scalar == 0.0 {
            return Err(VectorError::DivisionByZero);
        }
        Ok(Vector::new(self.x / scalar, self.y / scalar))
    }

    /// Euclidean length
    pub fn abs(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction
    pub fn norm(&self) -> Result<Vector, VectorError> {
        self.divide(self.abs())
    }

    /// Lengthen the vector by `length` along its own direction
    pub fn extend(&self, length: f64) -> Result<Vector, VectorError> {
        Ok(self.add(self.norm()?.multiply(length)))
    }

    /// Rotate by `degrees`
    pub fn rotate(&self, degrees: f64) -> Vector {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Vector::new(cos * self.x + sin * self.y, cos * self.y - sin * self.x)
    }
}
