use crate::error::{InputError, Result};
use crate::geometry::{Curve2, PeriodicSpline};
use crate::math::distance_2d::{cumulative_distances, polyline_length};
use crate::math::interp::{linspace, sample_count};
use crate::math::{Point2, Vector2};
use crate::operations::fitting::FitPeriodicSpline;
use crate::operations::resample::ResampleSpline;

/// Chords per output element when measuring arc lengths.
const SUBDIVISIONS: usize = 16;

/// An evenly sampled closed race line.
#[derive(Debug, Clone, PartialEq)]
pub struct Raceline {
    /// The interpolating cubic spline through the shifted points.
    pub spline: PeriodicSpline,
    /// Unclosed samples along the race line.
    pub points: Vec<Point2>,
    /// Spline parameter of every sample.
    pub parameters: Vec<f64>,
    /// Arc length from the first sample to every sample, starting at `0.0`.
    pub s: Vec<f64>,
    /// Arc length of every element, the closing element included, so there
    /// are as many elements as samples.
    pub el_lengths: Vec<f64>,
    /// Total arc length of the race line.
    pub length: f64,
}

/// Builds a race line by shifting a reference line along its normals.
///
/// Every reference point `p[i]` moves to `p[i] + alpha[i] * n[i]`. A closed
/// cubic spline interpolates the shifted points and is sampled at roughly
/// `step` spacing; the arc lengths of the samples are measured along the
/// spline.
pub struct CreateRaceline<'a> {
    refline: &'a [Point2],
    normals: &'a [Vector2],
    alpha: &'a [f64],
    step: f64,
}

impl<'a> CreateRaceline<'a> {
    /// Creates a new `CreateRaceline` operation.
    ///
    /// `refline` is unclosed; `normals` and `alpha` hold one entry per
    /// reference point.
    #[must_use]
    pub fn new(
        refline: &'a [Point2],
        normals: &'a [Vector2],
        alpha: &'a [f64],
        step: f64,
    ) -> Self {
        Self {
            refline,
            normals,
            alpha,
            step,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// - `InputError::LengthMismatch` if normals or shifts do not match the
    ///   reference line
    /// - `InputError::NotEnoughPoints` for fewer than 2 reference points
    /// - `InputError::InvalidParameter` for an unusable `step`
    /// - any error of the spline fit or the resampling
    pub fn execute(&self) -> Result<Raceline> {
        let n = self.refline.len();
        let inputs = [
            ("normal vectors", self.normals.len()),
            ("lateral shifts", self.alpha.len()),
        ];
        for (what, actual) in inputs {
            if actual != n {
                return Err(InputError::LengthMismatch {
                    what,
                    expected: n,
                    actual,
                }
                .into());
            }
        }
        if n < 2 {
            return Err(InputError::NotEnoughPoints(n).into());
        }
        sample_count(0.0, self.step, "step")?;

        let mut shifted: Vec<Point2> = self
            .refline
            .iter()
            .zip(self.normals)
            .zip(self.alpha)
            .map(|((p, normal), &a)| p + normal * a)
            .collect();
        shifted.push(shifted[0]);

        let fit = FitPeriodicSpline::new(&shifted, 3, 0.0).execute()?;
        let sampled =
            ResampleSpline::new(&fit.spline, polyline_length(&shifted), self.step).execute()?;

        let el_lengths: Vec<f64> = sampled
            .parameters
            .windows(2)
            .map(|w| arc_length(&fit.spline, w[0], w[1]))
            .collect();
        let mut s = cumulative_distances(&el_lengths);
        let length = s.pop().unwrap_or(0.0);
        let mut parameters = sampled.parameters;
        parameters.pop();

        tracing::debug!(points = sampled.points.len(), length, "created race line");
        Ok(Raceline {
            spline: fit.spline,
            points: sampled.points,
            parameters,
            s,
            el_lengths,
            length,
        })
    }
}

fn arc_length<C: Curve2>(curve: &C, t0: f64, t1: f64) -> f64 {
    let points: Vec<Point2> = linspace(t0, t1, SUBDIVISIONS + 1)
        .iter()
        .map(|&t| curve.evaluate(t))
        .collect();
    polyline_length(&points)
}
