use crate::error::{InputError, Result};
use crate::geometry::ClosedTrack;
use crate::math::interp::interp;
use crate::math::side_of_line::side_of_line;
use crate::operations::query::TrackProjection;

/// Track widths re-measured from a new reference line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledWidths {
    /// Distance to the right boundary at every output sample.
    pub w_right: Vec<f64>,
    /// Distance to the left boundary at every output sample.
    pub w_left: Vec<f64>,
}

/// Moves the track widths from the original centerline onto a smoothed one.
///
/// Every original point `i` was projected onto the new line at distance `d`.
/// The side of that projection relative to the original segment `i → i + 1`
/// (the closing point reuses the side of point 0) tells which way the
/// reference moved; the boundaries stay fixed in the plane, so
///
/// - `w_right + sign * d` and
/// - `w_left - sign * d`
///
/// with `sign` `+1` for left and `-1` for right. The new widths are attached
/// to the projected parameters, sorted by parameter and linearly interpolated
/// (clamped) onto the output parameters. The last output parameter closes the
/// loop and is dropped.
pub struct ReconcileWidths<'a> {
    track: &'a ClosedTrack,
    projection: &'a TrackProjection,
    parameters: &'a [f64],
}

impl<'a> ReconcileWidths<'a> {
    /// Creates a new `ReconcileWidths` operation.
    ///
    /// `projection` holds one result per point of `track`, closing point
    /// included; `parameters` are the output sample parameters, closing one
    /// included.
    #[must_use]
    pub fn new(
        track: &'a ClosedTrack,
        projection: &'a TrackProjection,
        parameters: &'a [f64],
    ) -> Self {
        Self {
            track,
            projection,
            parameters,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// - `InputError::NotEnoughPoints` if the closed track has fewer than 2 points
    /// - `InputError::LengthMismatch` if the projection does not cover every
    ///   closed-track point
    pub fn execute(&self) -> Result<ReconciledWidths> {
        let points = self.track.points();
        let results = &self.projection.results;
        if points.len() < 2 {
            return Err(InputError::NotEnoughPoints(points.len()).into());
        }
        if results.len() != points.len() {
            return Err(InputError::LengthMismatch {
                what: "projected points",
                expected: points.len(),
                actual: results.len(),
            }
            .into());
        }

        let mut signs: Vec<f64> = points
            .windows(2)
            .zip(results)
            .map(|(seg, res)| {
                side_of_line(&seg[0].position(), &seg[1].position(), &res.point).sign()
            })
            .collect();
        signs.push(signs[0]);

        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|&a, &b| results[a].parameter.total_cmp(&results[b].parameter));

        let xp: Vec<f64> = order.iter().map(|&i| results[i].parameter).collect();
        let right: Vec<f64> = order
            .iter()
            .map(|&i| points[i].w_right + signs[i] * results[i].distance)
            .collect();
        let left: Vec<f64> = order
            .iter()
            .map(|&i| points[i].w_left - signs[i] * results[i].distance)
            .collect();

        let mut w_right = interp(self.parameters, &xp, &right)?;
        let mut w_left = interp(self.parameters, &xp, &left)?;
        w_right.pop();
        w_left.pop();

        Ok(ReconciledWidths { w_right, w_left })
    }
}
