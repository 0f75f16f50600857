use super::{Point2, TOLERANCE};

/// Half-plane of a point relative to a directed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Counter-clockwise of the walking direction.
    Left,
    /// Clockwise of the walking direction.
    Right,
    /// On the line (within [`TOLERANCE`]).
    On,
}

impl Side {
    /// Returns `+1.0` for left, `-1.0` for right and `0.0` on the line.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
            Side::On => 0.0,
        }
    }
}

/// Determines on which side of the directed line `a → b` the point `z` lies.
///
/// Uses the sign of the 2D cross product `(b - a) x (z - a)`.
#[must_use]
pub fn side_of_line(a: &Point2, b: &Point2, z: &Point2) -> Side {
    let ab = b - a;
    let az = z - a;
    let cross = ab.x * az.y - ab.y * az.x;
    if cross > TOLERANCE {
        Side::Left
    } else if cross < -TOLERANCE {
        Side::Right
    } else {
        Side::On
    }
}
