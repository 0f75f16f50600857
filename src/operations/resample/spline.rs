use crate::error::{GeometryError, Result};
use crate::geometry::Curve2;
use crate::math::interp::{linspace, sample_count};
use crate::math::{Point2, TOLERANCE};
use crate::operations::query::SplineLength;

/// Output of [`ResampleSpline`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledSpline {
    /// Unclosed samples: the sample at the end of the domain is dropped.
    pub points: Vec<Point2>,
    /// All sample parameters, the dropped closing one included.
    pub parameters: Vec<f64>,
    /// Approximate curve length the sample count was derived from.
    pub length: f64,
}

/// Samples a closed curve at (approximately) uniform arc length.
///
/// The length is measured with [`SplineLength::from_rough_length`], then the
/// curve is sampled at `ceil(length / step) + 1` parameters spread uniformly
/// over the domain. The curve is assumed to be close to arc-length
/// parameterized, which holds for a fit on chord-length parameters.
pub struct ResampleSpline<'a, C> {
    curve: &'a C,
    rough_length: f64,
    step: f64,
}

impl<'a, C: Curve2> ResampleSpline<'a, C> {
    /// Creates a new resampling operation.
    ///
    /// `rough_length` is a prior length estimate that sets the measurement
    /// density, typically the perimeter of the fitted polyline.
    #[must_use]
    pub fn new(curve: &'a C, rough_length: f64, step: f64) -> Self {
        Self {
            curve,
            rough_length,
            step,
        }
    }

    /// Executes the resampling.
    ///
    /// # Errors
    ///
    /// - `InputError::InvalidParameter` if `step` is not a positive finite number
    ///   or too small for the curve length
    /// - `GeometryError::Degenerate` if the curve has no measurable length
    pub fn execute(&self) -> Result<ResampledSpline> {
        sample_count(0.0, self.step, "output_step")?;

        let length = SplineLength::from_rough_length(self.curve, self.rough_length).execute();
        if length <= TOLERANCE {
            return Err(GeometryError::Degenerate("curve has zero length".into()).into());
        }

        let count = sample_count(length, self.step, "output_step")?;
        let domain = self.curve.domain();
        let parameters = linspace(domain.t_min, domain.t_max, count);
        let points = parameters[..count - 1]
            .iter()
            .map(|&t| self.curve.evaluate(t))
            .collect();

        tracing::debug!(length, samples = count - 1, "resampled spline");
        Ok(ResampledSpline {
            points,
            parameters,
            length,
        })
    }
}
