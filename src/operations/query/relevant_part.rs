use crate::error::{InputError, Result};
use crate::math::Point2;

/// A point of a path together with its arc-length coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStation {
    /// Arc-length coordinate.
    pub s: f64,
    /// Position.
    pub point: Point2,
}

impl PathStation {
    /// Creates a new station.
    #[must_use]
    pub fn new(s: f64, point: Point2) -> Self {
        Self { s, point }
    }
}

/// The window of a closed path around a position, see [`RelevantPathPart`].
#[derive(Debug, Clone, PartialEq)]
pub struct RelevantPart {
    /// Stations in driving order. `s` is strictly increasing but does not
    /// start at zero; stations taken from the next lap carry `s + s_tot`.
    pub path: Vec<PathStation>,
    /// Matching part of the right boundary, if one was given.
    pub bound_right: Option<Vec<Point2>>,
    /// Matching part of the left boundary, if one was given.
    pub bound_left: Option<Vec<Point2>>,
}

/// Extracts the part of a closed path around a position.
///
/// The path is closed: its last station repeats the first one at
/// `s = s_tot`. The part covers `[s_pos - dist_back, s_pos + dist_forw]` plus
/// the last station before and the first station after that range, wrapping
/// over the start line when needed. Boundaries, if given, hold one point per
/// station and are cut the same way.
pub struct RelevantPathPart<'a> {
    path: &'a [PathStation],
    s_pos: f64,
    dist_back: f64,
    dist_forw: f64,
    bound_right: Option<&'a [Point2]>,
    bound_left: Option<&'a [Point2]>,
}

impl<'a> RelevantPathPart<'a> {
    /// Default backward and forward distance in m.
    pub const DEFAULT_DISTANCE: f64 = 20.0;

    /// Creates a new query reaching 20 m back and forth.
    #[must_use]
    pub fn new(path: &'a [PathStation], s_pos: f64) -> Self {
        Self {
            path,
            s_pos,
            dist_back: Self::DEFAULT_DISTANCE,
            dist_forw: Self::DEFAULT_DISTANCE,
            bound_right: None,
            bound_left: None,
        }
    }

    /// Sets the backward and forward distances.
    #[must_use]
    pub fn with_distances(mut self, dist_back: f64, dist_forw: f64) -> Self {
        self.dist_back = dist_back;
        self.dist_forw = dist_forw;
        self
    }

    /// Attaches boundaries to cut along with the path.
    #[must_use]
    pub fn with_bounds(
        mut self,
        right: Option<&'a [Point2]>,
        left: Option<&'a [Point2]>,
    ) -> Self {
        self.bound_right = right;
        self.bound_left = left;
        self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// - `InputError::NotEnoughPoints` for fewer than 2 stations
    /// - `InputError::InvalidParameter` if `dist_back + dist_forw` is not
    ///   shorter than the path
    /// - `InputError::LengthMismatch` if a boundary does not have one point
    ///   per station
    pub fn execute(&self) -> Result<RelevantPart> {
        let n = self.path.len();
        if n < 2 {
            return Err(InputError::NotEnoughPoints(n).into());
        }
        let s_tot = self.path[n - 1].s;

        let reach = self.dist_back + self.dist_forw;
        if !reach.is_finite() || reach >= s_tot {
            return Err(InputError::InvalidParameter {
                parameter: "dist_back + dist_forw",
                value: reach,
                reason: "must be shorter than the path",
            }
            .into());
        }
        for (what, bound) in [
            ("right boundary", self.bound_right),
            ("left boundary", self.bound_left),
        ] {
            if let Some(bound) = bound {
                if bound.len() != n {
                    return Err(InputError::LengthMismatch {
                        what,
                        expected: n,
                        actual: bound.len(),
                    }
                    .into());
                }
            }
        }

        let s_pos = if self.s_pos >= s_tot {
            self.s_pos - s_tot
        } else {
            self.s_pos
        };
        let mut s_min = s_pos - self.dist_back;
        let mut s_max = s_pos + self.dist_forw;
        if s_min < 0.0 {
            s_min += s_tot;
        }
        if s_max > s_tot {
            s_max -= s_tot;
        }

        // last station at or before s_min, first station at or after s_max
        let start = self
            .path
            .partition_point(|st| st.s <= s_min)
            .saturating_sub(1);
        let stop = (self.path.partition_point(|st| st.s < s_max) + 1).min(n);

        if start < stop {
            return Ok(RelevantPart {
                path: self.path[start..stop].to_vec(),
                bound_right: self.bound_right.map(|b| b[start..stop].to_vec()),
                bound_left: self.bound_left.map(|b| b[start..stop].to_vec()),
            });
        }

        // crossing the start line: the closing station appears only once
        let wrap = |b: &[Point2]| -> Vec<Point2> {
            b[start..n - 1].iter().chain(&b[..stop]).copied().collect()
        };
        let path = self.path[start..n - 1]
            .iter()
            .copied()
            .chain(
                self.path[..stop]
                    .iter()
                    .map(|st| PathStation::new(st.s + s_tot, st.point)),
            )
            .collect();
        Ok(RelevantPart {
            path,
            bound_right: self.bound_right.map(wrap),
            bound_left: self.bound_left.map(wrap),
        })
    }
}
