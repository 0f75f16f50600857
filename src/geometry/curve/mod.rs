mod periodic_spline;

pub use periodic_spline::{PeriodicSpline, MAX_DEGREE};
pub(crate) use periodic_spline::{check_degree, uniform_basis};

use crate::math::{Point2, Vector2};

/// Parameter domain for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }
}

/// Trait for parametric curves in the plane.
///
/// Curves are closed and periodic over their domain: evaluating outside the
/// domain wraps around.
pub trait Curve2 {
    /// Evaluates the curve at parameter `t`.
    fn evaluate(&self, t: f64) -> Point2;

    /// Computes the first derivative `dC/dt` at parameter `t` (not normalized).
    fn derivative(&self, t: f64) -> Vector2;

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain;
}
