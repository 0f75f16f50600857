use nalgebra::DMatrix;
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::error::{FitError, GeometryError, InputError, Result};
use crate::geometry::curve::{check_degree, uniform_basis, PeriodicSpline, MAX_DEGREE};
use crate::math::distance_2d::{cumulative_distances, element_lengths, euclidean_distance};
use crate::math::{Point2, Vector2, TOLERANCE};

/// Bounds of the penalty weight search, as powers of ten.
const LOG_LAMBDA_MIN: f64 = -10.0;
const LOG_LAMBDA_MAX: f64 = 10.0;

/// Bisection stops once the `log10` bracket is narrower than this.
const LOG_LAMBDA_RESOLUTION: f64 = 1e-3;

/// Bisection stops once the residual is within this fraction below the budget.
const RESIDUAL_RTOL: f64 = 1e-3;

const MAX_BISECTIONS: usize = 64;

/// Result of a periodic spline fit.
#[derive(Debug, Clone)]
pub struct SplineFit {
    /// The fitted spline.
    pub spline: PeriodicSpline,
    /// Chord-length parameter of every input point of the closed sequence,
    /// from `0.0` to `1.0`.
    pub parameters: Vec<f64>,
    /// Sum of squared distances between the data and the spline at `parameters`.
    pub residual: f64,
    /// Weight of the curvature penalty that produced the spline.
    pub penalty_weight: f64,
}

/// Fits a closed smoothing spline through a closed point sequence.
///
/// The spline has one control point per distinct data point and is fit by
/// penalized least squares: the sum of squared distances to the data plus
/// `λ` times the energy of the cyclic second differences of the control
/// points (a P-spline). The smoothing factor bounds the residual sum of
/// squares:
///
/// - `smoothing == 0` interpolates every point (`λ = 0`);
/// - otherwise the stiffest fit whose residual stays within `smoothing` is
///   returned, found by bisection on `log10 λ`.
///
/// Points are parameterized by normalized cumulative chord length.
#[derive(Debug)]
pub struct FitPeriodicSpline<'a> {
    points: &'a [Point2],
    degree: usize,
    smoothing: f64,
}

/// One row of the collocation matrix: the span hit by a data point and the
/// basis weights of the span's control points.
struct Collocation {
    indices: [usize; MAX_DEGREE + 1],
    weights: [f64; MAX_DEGREE + 1],
}

/// A solved system for one penalty weight.
struct Candidate {
    control: Vec<Point2>,
    residual: f64,
    lambda: f64,
}

impl<'a> FitPeriodicSpline<'a> {
    /// Creates a new fit.
    ///
    /// `points` is a closed sequence (last point repeating the first); an
    /// unclosed sequence is closed implicitly.
    #[must_use]
    pub fn new(points: &'a [Point2], degree: usize, smoothing: f64) -> Self {
        Self {
            points,
            degree,
            smoothing,
        }
    }

    /// Executes the fit.
    ///
    /// # Errors
    ///
    /// - `FitError::UnsupportedDegree` unless the degree is odd and in `1..=5`
    /// - `InputError::InvalidParameter` for a negative or non-finite smoothing factor
    /// - `FitError::InsufficientPoints` if there are not more distinct points than the degree
    /// - `GeometryError::DuplicatePoint` if two consecutive points coincide
    /// - `FitError::Singular` if the normal equations cannot be factored
    pub fn execute(&self) -> Result<SplineFit> {
        check_degree(self.degree)?;
        if !self.smoothing.is_finite() || self.smoothing < 0.0 {
            return Err(InputError::InvalidParameter {
                parameter: "smoothing_factor",
                value: self.smoothing,
                reason: "must be non-negative and finite",
            }
            .into());
        }

        let data = self.distinct_points();
        let m = data.len();
        let layout = PeriodicSpline::new(self.degree, vec![Point2::origin(); m])?;

        let parameters = chord_parameters(data)?;
        let rows: Vec<Collocation> = parameters[..m]
            .iter()
            .map(|&u| {
                let (span, r) = layout.locate(u);
                let basis = uniform_basis(self.degree, r);
                let mut indices = [0; MAX_DEGREE + 1];
                for (i, index) in indices.iter_mut().enumerate().take(self.degree + 1) {
                    *index = layout.control_index(span, i);
                }
                Collocation {
                    indices,
                    weights: basis,
                }
            })
            .collect();

        let system = NormalEquations::assemble(data, &rows, self.degree);

        let best = if self.smoothing == 0.0 {
            system.solve(data, &rows, 0.0)?
        } else {
            self.search_penalty(&system, data, &rows)?
        };

        tracing::debug!(
            points = m,
            residual = best.residual,
            lambda = best.lambda,
            "fitted periodic spline"
        );

        Ok(SplineFit {
            spline: PeriodicSpline::new(self.degree, best.control)?,
            parameters,
            residual: best.residual,
            penalty_weight: best.lambda,
        })
    }

    /// Returns the distinct points of the loop (closing duplicate removed).
    fn distinct_points(&self) -> &'a [Point2] {
        let n = self.points.len();
        if n >= 2 && euclidean_distance(&self.points[0], &self.points[n - 1]) <= TOLERANCE {
            &self.points[..n - 1]
        } else {
            self.points
        }
    }

    /// Finds the stiffest fit whose residual stays within the smoothing factor.
    fn search_penalty(
        &self,
        system: &NormalEquations,
        data: &[Point2],
        rows: &[Collocation],
    ) -> Result<Candidate> {
        let stiff = system.solve(data, rows, 10f64.powf(LOG_LAMBDA_MAX))?;
        if stiff.residual <= self.smoothing {
            return Ok(stiff);
        }

        let mut best = system.solve(data, rows, 10f64.powf(LOG_LAMBDA_MIN))?;
        if best.residual > self.smoothing {
            return Ok(best);
        }

        let mut lo = LOG_LAMBDA_MIN;
        let mut hi = LOG_LAMBDA_MAX;
        for _ in 0..MAX_BISECTIONS {
            if hi - lo < LOG_LAMBDA_RESOLUTION
                || self.smoothing - best.residual <= RESIDUAL_RTOL * self.smoothing
            {
                break;
            }
            let mid = 0.5 * (lo + hi);
            let candidate = system.solve(data, rows, 10f64.powf(mid))?;
            if candidate.residual <= self.smoothing {
                lo = mid;
                best = candidate;
            } else {
                hi = mid;
            }
        }
        Ok(best)
    }
}

/// Normalized cumulative chord length of the closed loop through `data`.
///
/// Returns `data.len() + 1` values from `0.0` to `1.0`.
fn chord_parameters(data: &[Point2]) -> Result<Vec<f64>> {
    let mut closed = data.to_vec();
    closed.push(data[0]);
    let el_lengths = element_lengths(&closed);
    if let Some(index) = el_lengths.iter().position(|len| *len <= TOLERANCE) {
        return Err(GeometryError::DuplicatePoint { index }.into());
    }
    let dists = cumulative_distances(&el_lengths);
    let total = dists[dists.len() - 1];
    let mut params: Vec<f64> = dists.iter().map(|d| d / total).collect();
    if let Some(last) = params.last_mut() {
        *last = 1.0;
    }
    Ok(params)
}

/// Least-squares part `BᵀB`, `Bᵀ[x y]` and the penalty `DᵀD`.
///
/// Both sparse matrices hold the full symmetric pattern; duplicate entries
/// are summed on conversion to CSC.
struct NormalEquations {
    gram: CooMatrix<f64>,
    rhs: DMatrix<f64>,
    penalty: CooMatrix<f64>,
}

impl NormalEquations {
    fn assemble(data: &[Point2], rows: &[Collocation], degree: usize) -> Self {
        let m = data.len();
        let mut gram = CooMatrix::new(m, m);
        let mut rhs = DMatrix::zeros(m, 2);

        for (row, q) in rows.iter().zip(data) {
            for a in 0..=degree {
                let ia = row.indices[a];
                let wa = row.weights[a];
                rhs[(ia, 0)] += wa * q.x;
                rhs[(ia, 1)] += wa * q.y;
                for b in 0..=degree {
                    gram.push(ia, row.indices[b], wa * row.weights[b]);
                }
            }
        }

        // Cyclic second differences c[i-1] - 2 c[i] + c[i+1].
        let mut penalty = CooMatrix::new(m, m);
        for i in 0..m {
            let stencil = [((i + m - 1) % m, 1.0), (i, -2.0), ((i + 1) % m, 1.0)];
            for &(ia, wa) in &stencil {
                for &(ib, wb) in &stencil {
                    penalty.push(ia, ib, wa * wb);
                }
            }
        }

        Self { gram, rhs, penalty }
    }

    fn solve(&self, data: &[Point2], rows: &[Collocation], lambda: f64) -> Result<Candidate> {
        let mut matrix = self.gram.clone();
        if lambda > 0.0 {
            for (i, j, v) in self.penalty.triplet_iter() {
                matrix.push(i, j, lambda * v);
            }
        }
        let csc = CscMatrix::from(&matrix);
        let chol = CscCholesky::factor(&csc).map_err(|_| FitError::Singular)?;
        let solution = chol.solve(&self.rhs);
        let control: Vec<Point2> = solution
            .row_iter()
            .map(|row| Point2::new(row[0], row[1]))
            .collect();
        if control.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(FitError::Singular.into());
        }

        let residual = rows
            .iter()
            .zip(data)
            .map(|(row, q)| {
                let mut fitted = Vector2::zeros();
                for (index, weight) in row.indices.iter().zip(&row.weights) {
                    fitted += control[*index].coords * *weight;
                }
                (fitted - q.coords).norm_squared()
            })
            .sum();

        Ok(Candidate {
            control,
            residual,
            lambda,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FitError;
    use crate::geometry::curve::Curve2;
    use crate::TracklineError;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    /// Closed polygon approximating a circle, closing point included.
    fn circle(n: usize, radius: f64) -> Vec<Point2> {
        let mut pts: Vec<Point2> = (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let a = i as f64 * std::f64::consts::TAU / n as f64;
                Point2::new(radius * a.cos(), radius * a.sin())
            })
            .collect();
        pts.push(pts[0]);
        pts
    }

    /// Circle with a deterministic radial zig-zag.
    fn wobbly_circle(n: usize) -> Vec<Point2> {
        let mut pts: Vec<Point2> = (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let a = i as f64 * std::f64::consts::TAU / n as f64;
                let r = if i % 2 == 0 { 50.3 } else { 49.7 };
                Point2::new(r * a.cos(), r * a.sin())
            })
            .collect();
        pts.push(pts[0]);
        pts
    }

    #[test]
    fn sparse_solve_matches_dense_cholesky() {
        let closed = wobbly_circle(30);
        let data = &closed[..30];
        let layout = PeriodicSpline::new(3, vec![Point2::origin(); 30]).unwrap();
        let rows: Vec<Collocation> = chord_parameters(data).unwrap()[..30]
            .iter()
            .map(|&u| {
                let (span, r) = layout.locate(u);
                let mut indices = [0; MAX_DEGREE + 1];
                for (i, index) in indices.iter_mut().enumerate().take(4) {
                    *index = layout.control_index(span, i);
                }
                Collocation {
                    indices,
                    weights: uniform_basis(3, r),
                }
            })
            .collect();
        let system = NormalEquations::assemble(data, &rows, 3);
        let lambda = 0.5;
        let sparse = system.solve(data, &rows, lambda).unwrap();

        let gram = DMatrix::from(&CscMatrix::from(&system.gram));
        let penalty = DMatrix::from(&CscMatrix::from(&system.penalty));
        let dense = (gram + penalty * lambda)
            .cholesky()
            .unwrap()
            .solve(&system.rhs);
        for (i, c) in sparse.control.iter().enumerate() {
            assert_relative_eq!(c.x, dense[(i, 0)], epsilon = 1e-9);
            assert_relative_eq!(c.y, dense[(i, 1)], epsilon = 1e-9);
        }
    }

    #[test]
    fn zero_smoothing_interpolates() {
        let pts = circle(40, 20.0);
        let fit = FitPeriodicSpline::new(&pts, 3, 0.0).execute().unwrap();
        assert_eq!(fit.parameters.len(), pts.len());
        assert_abs_diff_eq!(fit.parameters[0], 0.0);
        assert_abs_diff_eq!(fit.parameters[40], 1.0);
        assert!(fit.residual < 1e-16, "residual={}", fit.residual);
        assert_abs_diff_eq!(fit.penalty_weight, 0.0);
        for (u, p) in fit.parameters.iter().zip(&pts) {
            let q = fit.spline.evaluate(*u);
            assert_relative_eq!(q.x, p.x, epsilon = 1e-8);
            assert_relative_eq!(q.y, p.y, epsilon = 1e-8);
        }
    }

    #[test]
    fn linear_interpolation_hits_points() {
        let pts = circle(12, 5.0);
        let fit = FitPeriodicSpline::new(&pts, 1, 0.0).execute().unwrap();
        assert_eq!(fit.spline.control_points().len(), 12);
        assert!(fit.residual < 1e-20);
    }

    #[test]
    fn smoothing_respects_budget() {
        let pts = wobbly_circle(200);
        let budget = 5.0;
        let fit = FitPeriodicSpline::new(&pts, 3, budget).execute().unwrap();
        assert!(fit.residual <= budget, "residual={}", fit.residual);
        // The zig-zag carries 200 * 0.09 = 18 of squared deviation; most of
        // the budget should be spent on removing it.
        assert!(fit.residual > 0.5 * budget, "residual={}", fit.residual);
        assert!(fit.penalty_weight > 0.0);
    }

    #[test]
    fn smoothing_flattens_the_zigzag() {
        let pts = wobbly_circle(200);
        let fit = FitPeriodicSpline::new(&pts, 3, 17.0).execute().unwrap();
        for step in 0..50 {
            let t = f64::from(step) / 50.0;
            let r = fit.spline.evaluate(t).coords.norm();
            assert!((r - 50.0).abs() < 0.2, "r={r} at t={t}");
        }
    }

    #[test]
    fn larger_budget_is_stiffer() {
        let pts = wobbly_circle(120);
        let soft = FitPeriodicSpline::new(&pts, 3, 1.0).execute().unwrap();
        let stiff = FitPeriodicSpline::new(&pts, 3, 8.0).execute().unwrap();
        assert!(stiff.penalty_weight > soft.penalty_weight);
        assert!(stiff.residual > soft.residual);
    }

    #[test]
    fn huge_budget_uses_stiffest_fit() {
        let pts = circle(30, 10.0);
        let fit = FitPeriodicSpline::new(&pts, 3, 1e9).execute().unwrap();
        assert_relative_eq!(fit.penalty_weight, 10f64.powf(LOG_LAMBDA_MAX));
        assert!(fit.residual <= 1e9);
    }

    #[test]
    fn unclosed_input_is_closed_implicitly() {
        let closed = circle(24, 3.0);
        let open = &closed[..24];
        let a = FitPeriodicSpline::new(&closed, 3, 0.0).execute().unwrap();
        let b = FitPeriodicSpline::new(open, 3, 0.0).execute().unwrap();
        assert_eq!(a.spline, b.spline);
        assert_eq!(a.parameters, b.parameters);
    }

    #[test]
    fn insufficient_points_for_degree() {
        let pts = circle(3, 1.0);
        let result = FitPeriodicSpline::new(&pts, 3, 0.0).execute();
        assert!(matches!(
            result,
            Err(TracklineError::Fit(FitError::InsufficientPoints {
                points: 3,
                degree: 3
            }))
        ));
    }

    #[test]
    fn even_degree_is_rejected() {
        let pts = circle(10, 1.0);
        let result = FitPeriodicSpline::new(&pts, 2, 0.0).execute();
        assert!(matches!(
            result,
            Err(TracklineError::Fit(FitError::UnsupportedDegree(2)))
        ));
    }

    #[test]
    fn negative_smoothing_is_rejected() {
        let pts = circle(10, 1.0);
        assert!(FitPeriodicSpline::new(&pts, 3, -1.0).execute().is_err());
    }

    #[test]
    fn duplicate_points_are_rejected() {
        let mut pts = circle(10, 1.0);
        pts.insert(3, pts[3]);
        let result = FitPeriodicSpline::new(&pts, 3, 0.0).execute();
        assert!(matches!(
            result,
            Err(TracklineError::Geometry(GeometryError::DuplicatePoint {
                index: 3
            }))
        ));
    }
}
