mod params;

pub use params::ApproximationParams;

use crate::error::Result;
use crate::geometry::{PeriodicSpline, Track, TrackPoint};
use crate::operations::fitting::FitPeriodicSpline;
use crate::operations::query::{ProjectTrack, TrackProjection};
use crate::operations::resample::{ResampleSpline, ResampleTrack};
use crate::operations::widths::ReconcileWidths;

/// Everything the approximation pipeline produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ApproximationResult {
    /// The smoothed, unclosed track.
    pub track: Track,
    /// The fitted periodic spline.
    pub spline: PeriodicSpline,
    /// Sum of squared fit residuals over the resampled points.
    pub residual: f64,
    /// Approximate length of the fitted spline.
    pub spline_length: f64,
    /// Projection of every original closed-track point onto the spline.
    pub projection: TrackProjection,
}

/// Smooths a track centerline with a periodic spline and re-samples it at
/// regular arc length, carrying the track widths over to the new line.
///
/// Steps:
/// 1. close the track and resample it linearly at `prep_step`,
/// 2. fit a periodic smoothing spline,
/// 3. sample the spline at `ceil(length / output_step) + 1` uniform
///    parameters and drop the closing sample,
/// 4. project every original point onto the spline, from its normalized
///    arc-length position,
/// 5. re-measure the widths from the spline and interpolate them onto the
///    output samples.
#[derive(Debug)]
pub struct SplineApproximation<'a> {
    track: &'a Track,
    params: ApproximationParams,
}

impl<'a> SplineApproximation<'a> {
    /// Creates a new approximation.
    #[must_use]
    pub fn new(track: &'a Track, params: ApproximationParams) -> Self {
        Self { track, params }
    }

    /// Executes the pipeline.
    ///
    /// # Errors
    ///
    /// - `InputError::InvalidParameter` / `FitError::UnsupportedDegree` for
    ///   unusable settings
    /// - `FitError::InsufficientPoints` if the resampled loop has no more
    ///   points than the degree
    /// - any error of the fit, the projection or the width reconciliation
    pub fn execute(&self) -> Result<ApproximationResult> {
        let params = &self.params;
        params.validate()?;

        let closed = self.track.closed();
        let resampled = ResampleTrack::new(self.track, params.prep_step).execute()?;
        let positions = resampled.positions();
        tracing::debug!(
            input = self.track.len(),
            resampled = positions.len(),
            "resampled track for fitting"
        );

        let fit = FitPeriodicSpline::new(&positions, params.degree, params.smoothing).execute()?;
        let sampled =
            ResampleSpline::new(&fit.spline, closed.total_length(), params.output_step).execute()?;

        let targets = closed.positions();
        let guesses = closed.normalized_parameters();
        let projection = ProjectTrack::new(&fit.spline, &targets, &guesses)
            .with_params(params.projection)
            .execute()?;
        if params.debug {
            tracing::info!(
                mean_deviation = projection.mean_deviation,
                max_deviation = projection.max_deviation,
                fallbacks = projection.fallbacks,
                "spline approximation deviation"
            );
        }

        let widths = ReconcileWidths::new(&closed, &projection, &sampled.parameters).execute()?;
        let points = sampled
            .points
            .iter()
            .zip(widths.w_right.iter().zip(&widths.w_left))
            .map(|(p, (&w_right, &w_left))| TrackPoint::new(p.x, p.y, w_right, w_left))
            .collect();

        Ok(ApproximationResult {
            track: Track::from_points_unchecked(points),
            spline: fit.spline,
            residual: fit.residual,
            spline_length: sampled.length,
            projection,
        })
    }
}

/// Smooths a track centerline, see [`SplineApproximation`].
///
/// Uses the default projection tuning.
///
/// # Errors
///
/// Same as [`SplineApproximation::execute`].
pub fn smooth(
    track: &Track,
    degree: usize,
    smoothing_factor: f64,
    prep_step: f64,
    output_step: f64,
    debug: bool,
) -> Result<Track> {
    let params = ApproximationParams {
        degree,
        smoothing: smoothing_factor,
        prep_step,
        output_step,
        debug,
        ..ApproximationParams::default()
    };
    Ok(SplineApproximation::new(track, params).execute()?.track)
}
