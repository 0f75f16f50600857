use crate::error::{GeometryError, InputError, Result};
use crate::math::distance_2d::{cumulative_distances, element_lengths, euclidean_distance};
use crate::math::{Point2, TOLERANCE};

/// A sample of a track centerline with its distances to both boundaries.
///
/// Widths are measured perpendicular to the driving direction: `w_right` to
/// the right-hand boundary, `w_left` to the left-hand boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
    pub w_right: f64,
    pub w_left: f64,
}

impl TrackPoint {
    /// Creates a new track point.
    #[must_use]
    pub fn new(x: f64, y: f64, w_right: f64, w_left: f64) -> Self {
        Self {
            x,
            y,
            w_right,
            w_left,
        }
    }

    /// Creates a track point from an `[x, y, w_right, w_left]` row.
    #[must_use]
    pub fn from_row(row: [f64; 4]) -> Self {
        Self::new(row[0], row[1], row[2], row[3])
    }

    /// Returns the point as an `[x, y, w_right, w_left]` row.
    #[must_use]
    pub fn to_row(&self) -> [f64; 4] {
        [self.x, self.y, self.w_right, self.w_left]
    }

    /// Returns the centerline position.
    #[must_use]
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// An unclosed track: the last point connects back to the first implicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    points: Vec<TrackPoint>,
}

impl Track {
    /// Creates a track from its points.
    ///
    /// # Errors
    ///
    /// - `InputError::NotEnoughPoints` if fewer than 2 points are given
    /// - `GeometryError::DuplicatePoint` if two consecutive points coincide,
    ///   including the closing pair (last → first)
    pub fn new(points: Vec<TrackPoint>) -> Result<Self> {
        if points.len() < 2 {
            return Err(InputError::NotEnoughPoints(points.len()).into());
        }
        let n = points.len();
        for i in 0..n {
            let a = points[i].position();
            let b = points[(i + 1) % n].position();
            if euclidean_distance(&a, &b) <= TOLERANCE {
                return Err(GeometryError::DuplicatePoint { index: i }.into());
            }
        }
        Ok(Self { points })
    }

    /// Creates a track from `[x, y, w_right, w_left]` rows.
    ///
    /// # Errors
    ///
    /// Same as [`Track::new`].
    pub fn from_rows(rows: &[[f64; 4]]) -> Result<Self> {
        Self::new(rows.iter().copied().map(TrackPoint::from_row).collect())
    }

    /// Wraps points produced by the smoothing pipeline without validation.
    pub(crate) fn from_points_unchecked(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }

    /// Returns the track points.
    #[must_use]
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether the track has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the points as `[x, y, w_right, w_left]` rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<[f64; 4]> {
        self.points.iter().map(TrackPoint::to_row).collect()
    }

    /// Returns the centerline positions.
    #[must_use]
    pub fn positions(&self) -> Vec<Point2> {
        self.points.iter().map(TrackPoint::position).collect()
    }

    /// Returns the closed track (first point appended at the end).
    #[must_use]
    pub fn closed(&self) -> ClosedTrack {
        let mut points = Vec::with_capacity(self.points.len() + 1);
        points.extend_from_slice(&self.points);
        if let Some(first) = self.points.first() {
            points.push(*first);
        }
        ClosedTrack { points }
    }
}

/// A track whose last point repeats its first point.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrack {
    points: Vec<TrackPoint>,
}

impl ClosedTrack {
    /// Wraps points whose last entry already repeats the first one.
    pub(crate) fn from_points_unchecked(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }

    /// Returns the points, closing point included.
    #[must_use]
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Returns the number of points, closing point included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether the closed track has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the centerline positions, closing point included.
    #[must_use]
    pub fn positions(&self) -> Vec<Point2> {
        self.points.iter().map(TrackPoint::position).collect()
    }

    /// Returns the length of every element; one entry less than points.
    #[must_use]
    pub fn element_lengths(&self) -> Vec<f64> {
        element_lengths(&self.positions())
    }

    /// Returns the cumulative distance to every point, starting at `0.0`.
    #[must_use]
    pub fn cumulative_distances(&self) -> Vec<f64> {
        cumulative_distances(&self.element_lengths())
    }

    /// Returns the perimeter of the loop.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.element_lengths().iter().sum()
    }

    /// Returns every point's arc-length position normalized to `[0, 1]`.
    #[must_use]
    pub fn normalized_parameters(&self) -> Vec<f64> {
        let dists = self.cumulative_distances();
        let total = dists.last().copied().unwrap_or(0.0);
        if total <= 0.0 {
            return vec![0.0; dists.len()];
        }
        dists.iter().map(|d| d / total).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::TracklineError;
    use approx::assert_relative_eq;

    fn square_rows() -> Vec<[f64; 4]> {
        vec![
            [0.0, 0.0, 1.0, 2.0],
            [4.0, 0.0, 1.0, 2.0],
            [4.0, 4.0, 1.0, 2.0],
            [0.0, 4.0, 1.0, 2.0],
        ]
    }

    #[test]
    fn rows_roundtrip() {
        let track = Track::from_rows(&square_rows()).unwrap();
        assert_eq!(track.len(), 4);
        assert!(!track.is_empty());
        assert_eq!(track.to_rows(), square_rows());
    }

    #[test]
    fn closing_appends_first_point() {
        let track = Track::from_rows(&square_rows()).unwrap();
        let closed = track.closed();
        assert_eq!(closed.len(), track.len() + 1);
        assert_eq!(closed.points()[0], closed.points()[4]);
    }

    #[test]
    fn closed_lengths_and_parameters() {
        let closed = Track::from_rows(&square_rows()).unwrap().closed();
        let lens = closed.element_lengths();
        assert_eq!(lens.len(), 4);
        assert_relative_eq!(closed.total_length(), 16.0);
        let cum = closed.cumulative_distances();
        assert_eq!(cum, vec![0.0, 4.0, 8.0, 12.0, 16.0]);
        let params = closed.normalized_parameters();
        assert_relative_eq!(params[1], 0.25);
        assert_relative_eq!(params[4], 1.0);
    }

    #[test]
    fn single_point_is_rejected() {
        let result = Track::from_rows(&[[0.0, 0.0, 1.0, 1.0]]);
        assert!(matches!(
            result,
            Err(TracklineError::Input(InputError::NotEnoughPoints(1)))
        ));
    }

    #[test]
    fn consecutive_duplicate_is_rejected() {
        let mut rows = square_rows();
        rows.insert(2, rows[1]);
        let result = Track::from_rows(&rows);
        assert!(matches!(
            result,
            Err(TracklineError::Geometry(GeometryError::DuplicatePoint {
                index: 1
            }))
        ));
    }

    #[test]
    fn explicitly_closed_input_is_rejected() {
        let mut rows = square_rows();
        rows.push(rows[0]);
        let result = Track::from_rows(&rows);
        assert!(matches!(
            result,
            Err(TracklineError::Geometry(GeometryError::DuplicatePoint {
                index: 4
            }))
        ));
    }

    #[test]
    fn position_ignores_widths() {
        let p = TrackPoint::new(1.5, -2.0, 3.0, 4.0);
        assert_eq!(p.position(), Point2::new(1.5, -2.0));
    }
}
