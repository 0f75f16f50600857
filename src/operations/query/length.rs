use crate::geometry::Curve2;
use crate::math::distance_2d::polyline_length;
use crate::math::interp::{linspace, MAX_SAMPLES};

/// Approximates the length of a curve by a dense chord polyline.
///
/// The curve is sampled uniformly in parameter over its whole domain; closed
/// curves therefore yield a polyline whose last sample repeats the first.
pub struct SplineLength<'a, C> {
    curve: &'a C,
    samples: usize,
}

impl<'a, C: Curve2> SplineLength<'a, C> {
    /// Creates a new `SplineLength` query with an explicit sample count.
    ///
    /// The count is clamped to `2..=MAX_SAMPLES`.
    #[must_use]
    pub fn new(curve: &'a C, samples: usize) -> Self {
        Self {
            curve,
            samples: samples.clamp(2, MAX_SAMPLES),
        }
    }

    /// Creates a query sampling 4 points per unit of `rough_length`.
    ///
    /// `rough_length` is any prior estimate of the length, typically the
    /// perimeter of the polyline the curve was fitted to.
    #[must_use]
    pub fn from_rough_length(curve: &'a C, rough_length: f64) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let units = rough_length.max(0.0).ceil() as usize;
        Self::new(curve, units.saturating_mul(4))
    }

    /// Returns the number of samples used.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Executes the query, returning the approximate curve length.
    #[must_use]
    pub fn execute(&self) -> f64 {
        let domain = self.curve.domain();
        let ts = linspace(domain.t_min, domain.t_max, self.samples);
        let points: Vec<_> = ts.iter().map(|&t| self.curve.evaluate(t)).collect();
        polyline_length(&points)
    }
}
