use crate::error::{FitError, Result};
use crate::math::{Point2, Vector2};

use super::{Curve2, CurveDomain};

/// Highest supported spline degree.
pub const MAX_DEGREE: usize = 5;

/// A closed uniform B-spline curve with period 1.
///
/// `n` control points define `n` polynomial spans of width `1 / n`. Control
/// point `j` is centered on parameter `j / n`, so for an odd degree `k` the
/// span starting at `s / n` is shaped by control points
/// `s - (k - 1) / 2 ..= s + (k + 1) / 2` (indices modulo `n`).
///
/// The value is immutable: it is produced once by a fit and shared by
/// reference with every evaluation and projection.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicSpline {
    degree: usize,
    control: Vec<Point2>,
}

impl PeriodicSpline {
    /// Creates a periodic spline from its control points.
    ///
    /// # Errors
    ///
    /// - `FitError::UnsupportedDegree` unless `degree` is odd and in `1..=5`
    /// - `FitError::InsufficientPoints` if there are not more control points
    ///   than the degree
    pub fn new(degree: usize, control: Vec<Point2>) -> Result<Self> {
        check_degree(degree)?;
        if control.len() <= degree {
            return Err(FitError::InsufficientPoints {
                points: control.len(),
                degree,
            }
            .into());
        }
        Ok(Self { degree, control })
    }

    /// Returns the polynomial degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Returns the control points.
    #[must_use]
    pub fn control_points(&self) -> &[Point2] {
        &self.control
    }

    /// Returns the parameter width of one polynomial span.
    #[must_use]
    pub fn knot_spacing(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let n = self.control.len() as f64;
        1.0 / n
    }

    /// Evaluates the spline at every parameter in `ts`.
    #[must_use]
    pub fn evaluate_many(&self, ts: &[f64]) -> Vec<Point2> {
        ts.iter().map(|&t| self.evaluate(t)).collect()
    }

    /// Locates `t` (wrapped into the period) as `(span index, local parameter in [0, 1])`.
    pub(crate) fn locate(&self, t: f64) -> (usize, f64) {
        let n = self.control.len();
        #[allow(clippy::cast_precision_loss)]
        let u = t.rem_euclid(1.0) * n as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let span = (u.floor() as usize).min(n - 1);
        #[allow(clippy::cast_precision_loss)]
        let r = u - span as f64;
        (span, r)
    }

    /// Index of the `i`-th control point influencing `span`.
    pub(crate) fn control_index(&self, span: usize, i: usize) -> usize {
        let n = self.control.len();
        (span + i + n - (self.degree - 1) / 2) % n
    }
}

impl Curve2 for PeriodicSpline {
    fn evaluate(&self, t: f64) -> Point2 {
        let (span, r) = self.locate(t);
        let basis = uniform_basis(self.degree, r);
        let mut acc = Vector2::zeros();
        for (i, b) in basis.iter().take(self.degree + 1).enumerate() {
            acc += self.control[self.control_index(span, i)].coords * *b;
        }
        Point2::from(acc)
    }

    fn derivative(&self, t: f64) -> Vector2 {
        let (span, r) = self.locate(t);
        let basis = uniform_basis(self.degree - 1, r);
        let mut acc = Vector2::zeros();
        for (i, b) in basis.iter().take(self.degree).enumerate() {
            let p0 = self.control[self.control_index(span, i)];
            let p1 = self.control[self.control_index(span, i + 1)];
            acc += (p1 - p0) * *b;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.control.len() as f64;
        acc * n
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, 1.0)
    }
}

/// Checks that `degree` is odd and within `1..=MAX_DEGREE`.
pub(crate) fn check_degree(degree: usize) -> Result<()> {
    if degree == 0 || degree > MAX_DEGREE || degree % 2 == 0 {
        return Err(FitError::UnsupportedDegree(degree).into());
    }
    Ok(())
}

/// Uniform B-spline basis values of `degree` at local span parameter `r`.
///
/// Entry `i` (for `i <= degree`) weighs the `i`-th control point of the span;
/// entries past `degree` are zero. The values sum to one.
pub(crate) fn uniform_basis(degree: usize, r: f64) -> [f64; MAX_DEGREE + 1] {
    let mut n = [0.0; MAX_DEGREE + 1];
    n[0] = 1.0;
    for d in 1..=degree {
        let mut next = [0.0; MAX_DEGREE + 1];
        #[allow(clippy::cast_precision_loss)]
        let df = d as f64;
        for (i, value) in next.iter_mut().enumerate().take(d + 1) {
            #[allow(clippy::cast_precision_loss)]
            let fi = i as f64;
            let left = if i >= 1 { (r + df - fi) * n[i - 1] } else { 0.0 };
            let right = if i < d { (fi + 1.0 - r) * n[i] } else { 0.0 };
            *value = (left + right) / df;
        }
        n = next;
    }
    n
}
