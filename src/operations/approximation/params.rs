use crate::error::{InputError, Result};
use crate::geometry::curve::check_degree;
use crate::operations::query::ProjectionParams;

/// Settings of the spline approximation pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximationParams {
    /// Degree of the periodic spline; odd, `1..=5`.
    pub degree: usize,
    /// Bound on the sum of squared fit residuals; `0` interpolates.
    pub smoothing: f64,
    /// Linear resampling step before fitting, in m.
    pub prep_step: f64,
    /// Desired spacing of the output samples, in m. The true spacing is
    /// slightly smaller.
    pub output_step: f64,
    /// Logs the projection deviation summary at `info` level.
    pub debug: bool,
    /// Projection tuning.
    pub projection: ProjectionParams,
}

impl Default for ApproximationParams {
    fn default() -> Self {
        Self {
            degree: 3,
            smoothing: 10.0,
            prep_step: 1.0,
            output_step: 3.0,
            debug: false,
            projection: ProjectionParams::default(),
        }
    }
}

impl ApproximationParams {
    /// Checks every setting before any work is done.
    ///
    /// # Errors
    ///
    /// - `FitError::UnsupportedDegree` for an even or out-of-range degree
    /// - `InputError::InvalidParameter` naming the first bad setting
    pub fn validate(&self) -> Result<()> {
        check_degree(self.degree)?;
        if !self.smoothing.is_finite() || self.smoothing < 0.0 {
            return Err(InputError::InvalidParameter {
                parameter: "smoothing_factor",
                value: self.smoothing,
                reason: "must be non-negative and finite",
            }
            .into());
        }
        let steps = [
            ("prep_step", self.prep_step),
            ("output_step", self.output_step),
        ];
        for (parameter, value) in steps {
            if !value.is_finite() || value <= 0.0 {
                return Err(InputError::InvalidParameter {
                    parameter,
                    value,
                    reason: "must be positive and finite",
                }
                .into());
            }
        }
        self.projection.validate()
    }
}
