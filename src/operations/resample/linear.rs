use crate::error::{GeometryError, InputError, Result};
use crate::geometry::{ClosedTrack, Track, TrackPoint};
use crate::math::distance_2d::{cumulative_distances, element_lengths};
use crate::math::interp::{interp, linspace, sample_count};
use crate::math::TOLERANCE;

/// Closes a track and resamples it at a fixed linear step.
///
/// The loop is sampled at `ceil(perimeter / step) + 1` points spread evenly
/// in cumulative distance from `0` to the perimeter, so the result is closed
/// (first point == last point) and the true spacing is
/// `perimeter / (count - 1) <= step`. Positions and both widths are
/// interpolated linearly along the original polyline.
#[derive(Debug)]
pub struct ResampleTrack<'a> {
    track: &'a Track,
    step: f64,
}

impl<'a> ResampleTrack<'a> {
    /// Creates a new resampling operation.
    #[must_use]
    pub fn new(track: &'a Track, step: f64) -> Self {
        Self { track, step }
    }

    /// Executes the resampling.
    ///
    /// # Errors
    ///
    /// - `InputError::InvalidParameter` if `step` is not a positive finite number
    /// - `GeometryError::DuplicatePoint` if the loop contains a zero-length segment
    pub fn execute(&self) -> Result<ClosedTrack> {
        let closed = self.track.closed();
        let points = resample_polyline(closed.points(), self.step)?;
        Ok(ClosedTrack::from_points_unchecked(points))
    }
}

/// Resamples an open polyline of track points at a fixed linear step.
///
/// Returns `ceil(length / step) + 1` points, first and last coinciding with
/// the polyline's end points.
///
/// # Errors
///
/// - `InputError::InvalidParameter` if `step` is not a positive finite number
///   or too small for the polyline length
/// - `InputError::NotEnoughPoints` for fewer than 2 points
/// - `GeometryError::DuplicatePoint` if two consecutive points coincide
pub fn resample_polyline(points: &[TrackPoint], step: f64) -> Result<Vec<TrackPoint>> {
    sample_count(0.0, step, "step")?;
    if points.len() < 2 {
        return Err(InputError::NotEnoughPoints(points.len()).into());
    }

    let positions: Vec<_> = points.iter().map(TrackPoint::position).collect();
    let el_lengths = element_lengths(&positions);
    if let Some(index) = el_lengths.iter().position(|len| *len <= TOLERANCE) {
        return Err(GeometryError::DuplicatePoint { index }.into());
    }

    let dists_cum = cumulative_distances(&el_lengths);
    let total = dists_cum[dists_cum.len() - 1];

    let count = sample_count(total, step, "step")?;
    let targets = linspace(0.0, total, count);

    let channel = |f: fn(&TrackPoint) -> f64| -> Result<Vec<f64>> {
        let values: Vec<f64> = points.iter().map(f).collect();
        interp(&targets, &dists_cum, &values)
    };
    let xs = channel(|p: &TrackPoint| p.x)?;
    let ys = channel(|p: &TrackPoint| p.y)?;
    let w_rights = channel(|p: &TrackPoint| p.w_right)?;
    let w_lefts = channel(|p: &TrackPoint| p.w_left)?;

    Ok((0..count)
        .map(|i| TrackPoint::new(xs[i], ys[i], w_rights[i], w_lefts[i]))
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::TracklineError;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn straight_segment_step_two() {
        let pts = vec![
            TrackPoint::new(0.0, 0.0, 1.0, 1.0),
            TrackPoint::new(10.0, 0.0, 1.0, 1.0),
        ];
        let out = resample_polyline(&pts, 2.0).unwrap();
        assert_eq!(out.len(), 6);
        for (i, p) in out.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let expected = 2.0 * i as f64;
            assert_relative_eq!(p.x, expected, epsilon = 1e-12);
            assert_abs_diff_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn non_integer_ratio_shrinks_spacing() {
        let pts = vec![
            TrackPoint::new(0.0, 0.0, 1.0, 1.0),
            TrackPoint::new(10.0, 0.0, 1.0, 1.0),
        ];
        let out = resample_polyline(&pts, 3.0).unwrap();
        // ceil(10 / 3) + 1 = 5 samples, spacing 2.5
        assert_eq!(out.len(), 5);
        assert_relative_eq!(out[1].x, 2.5, epsilon = 1e-12);
        assert_relative_eq!(out[4].x, 10.0);
    }

    #[test]
    fn widths_are_interpolated() {
        let pts = vec![
            TrackPoint::new(0.0, 0.0, 1.0, 5.0),
            TrackPoint::new(4.0, 0.0, 3.0, 1.0),
        ];
        let out = resample_polyline(&pts, 1.0).unwrap();
        assert_eq!(out.len(), 5);
        assert_relative_eq!(out[2].w_right, 2.0, epsilon = 1e-12);
        assert_relative_eq!(out[2].w_left, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn closed_square_resample() {
        let track = Track::from_rows(&[
            [0.0, 0.0, 2.0, 2.0],
            [10.0, 0.0, 2.0, 2.0],
            [10.0, 10.0, 2.0, 2.0],
            [0.0, 10.0, 2.0, 2.0],
        ])
        .unwrap();
        let closed = ResampleTrack::new(&track, 1.0).execute().unwrap();
        assert_eq!(closed.len(), 41);
        let first = closed.points()[0];
        let last = closed.points()[40];
        assert_eq!(first, last);
        assert_relative_eq!(closed.total_length(), 40.0, epsilon = 1e-9);
        // corner sample lands exactly on the second vertex
        assert_relative_eq!(closed.points()[10].x, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(closed.points()[10].y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn duplicate_point_fails() {
        let pts = vec![
            TrackPoint::new(0.0, 0.0, 1.0, 1.0),
            TrackPoint::new(1.0, 0.0, 1.0, 1.0),
            TrackPoint::new(1.0, 0.0, 1.0, 1.0),
        ];
        let result = resample_polyline(&pts, 0.5);
        assert!(matches!(
            result,
            Err(TracklineError::Geometry(GeometryError::DuplicatePoint {
                index: 1
            }))
        ));
    }

    #[test]
    fn invalid_step_fails() {
        let pts = vec![
            TrackPoint::new(0.0, 0.0, 1.0, 1.0),
            TrackPoint::new(1.0, 0.0, 1.0, 1.0),
        ];
        assert!(resample_polyline(&pts, 0.0).is_err());
        assert!(resample_polyline(&pts, -1.0).is_err());
        assert!(resample_polyline(&pts, f64::NAN).is_err());
    }

    #[test]
    fn tiny_step_is_rejected() {
        let pts = vec![
            TrackPoint::new(0.0, 0.0, 1.0, 1.0),
            TrackPoint::new(100.0, 0.0, 1.0, 1.0),
        ];
        assert!(matches!(
            resample_polyline(&pts, 1e-300),
            Err(TracklineError::Input(InputError::InvalidParameter {
                parameter: "step",
                ..
            }))
        ));
    }
}
