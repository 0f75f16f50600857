use argmin::core::{CostFunction, Error as ArgminError, Executor, State};
use argmin::solver::brent::BrentOpt;
use rayon::prelude::*;

use crate::error::{FitError, InputError, Result};
use crate::geometry::Curve2;
use crate::math::distance_2d::euclidean_distance;
use crate::math::Point2;

/// Distance below which a projection is accepted without checking the
/// residual direction.
const ZERO_DISTANCE: f64 = 1e-6;

/// Iterations of the ternary refinement after the fallback grid search.
const REFINE_ITERATIONS: usize = 60;

/// Tuning of the per-point projection onto a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    /// Iteration cap of the Brent search.
    pub max_iters: u64,
    /// Absolute parameter tolerance of the Brent search.
    pub parameter_tolerance: f64,
    /// Largest accepted `|cos|` between the residual and the tangent.
    pub gradient_tolerance: f64,
    /// Half-width of the parameter window around the initial guess.
    pub search_window: f64,
    /// Grid resolution of the fallback search.
    pub fallback_samples: usize,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            max_iters: 200,
            parameter_tolerance: 1e-12,
            gradient_tolerance: 1e-2,
            search_window: 0.05,
            fallback_samples: 256,
        }
    }
}

impl ProjectionParams {
    /// Checks that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns `InputError::InvalidParameter` naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("parameter_tolerance", self.parameter_tolerance),
            ("gradient_tolerance", self.gradient_tolerance),
            ("search_window", self.search_window),
        ];
        for (parameter, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(InputError::InvalidParameter {
                    parameter,
                    value,
                    reason: "must be positive and finite",
                }
                .into());
            }
        }
        if self.max_iters == 0 {
            return Err(InputError::InvalidParameter {
                parameter: "max_iters",
                value: 0.0,
                reason: "must be at least 1",
            }
            .into());
        }
        if self.fallback_samples < 2 {
            #[allow(clippy::cast_precision_loss)]
            let value = self.fallback_samples as f64;
            return Err(InputError::InvalidParameter {
                parameter: "fallback_samples",
                value,
                reason: "must be at least 2",
            }
            .into());
        }
        Ok(())
    }
}

/// Result of a closest point query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPointResult {
    /// The closest point on the curve.
    pub point: Point2,
    /// The parameter value at the closest point.
    pub parameter: f64,
    /// The distance from the query point to the closest point.
    pub distance: f64,
    /// `false` when the local search failed and the fallback grid search
    /// produced the result.
    pub converged: bool,
}

/// Squared distance from a fixed point to the curve, as an argmin problem.
///
/// The parameter is the offset from `origin`, which keeps the relative part
/// of Brent's tolerance small.
struct SquaredDistance<'a, C> {
    curve: &'a C,
    target: Point2,
    origin: f64,
}

impl<C: Curve2> CostFunction for SquaredDistance<'_, C> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, offset: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
        Ok((self.curve.evaluate(self.origin + offset) - self.target).norm_squared())
    }
}

/// Finds the closest point on a curve to a given point, starting from a
/// parameter guess.
///
/// Brent's method minimizes the squared distance over the search window
/// around the guess. Its result is accepted when the residual `S(t) - p` is
/// perpendicular to the tangent within `gradient_tolerance` (or the distance
/// is negligible) and `t` stayed inside the search window. Otherwise a grid search over the window with ternary
/// refinement runs, the closer of both results is kept and it is flagged as
/// not converged.
pub struct ClosestPointOnCurve<'a, C> {
    curve: &'a C,
    point: Point2,
    guess: f64,
    params: ProjectionParams,
}

impl<'a, C: Curve2> ClosestPointOnCurve<'a, C> {
    /// Creates a new `ClosestPointOnCurve` query with default tuning.
    #[must_use]
    pub fn new(curve: &'a C, point: Point2, guess: f64) -> Self {
        Self {
            curve,
            point,
            guess,
            params: ProjectionParams::default(),
        }
    }

    /// Replaces the projection tuning.
    #[must_use]
    pub fn with_params(mut self, params: ProjectionParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// - `InputError::InvalidParameter` for unusable tuning or a non-finite guess
    /// - `FitError::Minimizer` if the minimizer cannot be set up or fails
    pub fn execute(&self) -> Result<ClosestPointResult> {
        self.params.validate()?;
        if !self.guess.is_finite() {
            return Err(InputError::InvalidParameter {
                parameter: "guess",
                value: self.guess,
                reason: "must be finite",
            }
            .into());
        }

        let local = self.at(self.minimize()?, true);
        if self.is_accepted(&local) {
            return Ok(local);
        }

        let fallback = self.grid_search();
        let best = if fallback.distance < local.distance {
            fallback
        } else {
            local
        };
        tracing::warn!(
            guess = self.guess,
            parameter = best.parameter,
            distance = best.distance,
            "projection did not converge, using bounded grid search"
        );
        Ok(ClosestPointResult {
            converged: false,
            ..best
        })
    }

    fn minimize(&self) -> Result<f64> {
        let problem = SquaredDistance {
            curve: self.curve,
            target: self.point,
            origin: self.guess,
        };
        let window = self.params.search_window;
        let solver = BrentOpt::new(-window, window)
            .set_tolerance(f64::EPSILON.sqrt(), self.params.parameter_tolerance);
        let max_iters = self.params.max_iters;
        let res = Executor::new(problem, solver)
            .configure(|state| state.max_iters(max_iters))
            .run()
            .map_err(|e| FitError::Minimizer(e.to_string()))?;
        let offset = res.state.get_best_param().copied().unwrap_or(0.0);
        Ok(self.guess + offset)
    }

    fn at(&self, t: f64, converged: bool) -> ClosestPointResult {
        let point = self.curve.evaluate(t);
        ClosestPointResult {
            point,
            parameter: t,
            distance: euclidean_distance(&point, &self.point),
            converged,
        }
    }

    fn is_accepted(&self, result: &ClosestPointResult) -> bool {
        if !result.parameter.is_finite()
            || (result.parameter - self.guess).abs() > self.params.search_window
        {
            return false;
        }
        if result.distance <= ZERO_DISTANCE {
            return true;
        }
        let residual = result.point - self.point;
        let tangent = self.curve.derivative(result.parameter);
        let scale = residual.norm() * tangent.norm();
        if scale <= f64::MIN_POSITIVE {
            return false;
        }
        residual.dot(&tangent).abs() / scale <= self.params.gradient_tolerance
    }

    fn grid_search(&self) -> ClosestPointResult {
        let window = self.params.search_window;
        let n_samples = self.params.fallback_samples;
        let lo = self.guess - window;
        #[allow(clippy::cast_precision_loss)]
        let dt = 2.0 * window / (n_samples - 1) as f64;

        let mut best_t = lo;
        let mut best_dist = f64::INFINITY;
        for i in 0..n_samples {
            #[allow(clippy::cast_precision_loss)]
            let t = lo + i as f64 * dt;
            let d = self.distance_at(t);
            if d < best_dist {
                best_dist = d;
                best_t = t;
            }
        }

        let mut lo = best_t - dt;
        let mut hi = best_t + dt;
        for _ in 0..REFINE_ITERATIONS {
            let mid1 = lo + (hi - lo) / 3.0;
            let mid2 = hi - (hi - lo) / 3.0;
            if self.distance_at(mid1) < self.distance_at(mid2) {
                hi = mid2;
            } else {
                lo = mid1;
            }
        }

        #[allow(clippy::manual_midpoint)]
        let refined = (lo + hi) / 2.0;
        let candidate = self.at(refined, false);
        if candidate.distance <= best_dist {
            candidate
        } else {
            self.at(best_t, false)
        }
    }

    fn distance_at(&self, t: f64) -> f64 {
        euclidean_distance(&self.curve.evaluate(t), &self.point)
    }
}

/// Projections of a whole point sequence onto a curve.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackProjection {
    /// One result per input point, in input order.
    pub results: Vec<ClosestPointResult>,
    /// Mean projection distance.
    pub mean_deviation: f64,
    /// Largest projection distance.
    pub max_deviation: f64,
    /// Number of points that needed the fallback search.
    pub fallbacks: usize,
}

impl TrackProjection {
    /// Returns the projected parameters, in input order.
    #[must_use]
    pub fn parameters(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.parameter).collect()
    }

    /// Returns the projection distances, in input order.
    #[must_use]
    pub fn distances(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.distance).collect()
    }
}

/// Projects every point onto a curve, each from its own parameter guess.
///
/// Points are independent, so they are projected in parallel; the output
/// order follows the input order.
pub struct ProjectTrack<'a, C> {
    curve: &'a C,
    points: &'a [Point2],
    guesses: &'a [f64],
    params: ProjectionParams,
}

impl<'a, C: Curve2 + Sync> ProjectTrack<'a, C> {
    /// Creates a new `ProjectTrack` query with default tuning.
    #[must_use]
    pub fn new(curve: &'a C, points: &'a [Point2], guesses: &'a [f64]) -> Self {
        Self {
            curve,
            points,
            guesses,
            params: ProjectionParams::default(),
        }
    }

    /// Replaces the projection tuning.
    #[must_use]
    pub fn with_params(mut self, params: ProjectionParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the projection.
    ///
    /// # Errors
    ///
    /// - `InputError::LengthMismatch` if points and guesses differ in length
    /// - any error of [`ClosestPointOnCurve::execute`]
    pub fn execute(&self) -> Result<TrackProjection> {
        if self.points.len() != self.guesses.len() {
            return Err(InputError::LengthMismatch {
                what: "projection guesses",
                expected: self.points.len(),
                actual: self.guesses.len(),
            }
            .into());
        }
        self.params.validate()?;

        let results = self
            .points
            .par_iter()
            .zip(self.guesses.par_iter())
            .map(|(point, &guess)| {
                ClosestPointOnCurve::new(self.curve, *point, guess)
                    .with_params(self.params)
                    .execute()
            })
            .collect::<Result<Vec<_>>>()?;

        let fallbacks = results.iter().filter(|r| !r.converged).count();
        let max_deviation = results.iter().map(|r| r.distance).fold(0.0, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let mean_deviation = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.distance).sum::<f64>() / results.len() as f64
        };
        tracing::debug!(
            points = results.len(),
            mean_deviation,
            max_deviation,
            fallbacks,
            "projected track onto curve"
        );

        Ok(TrackProjection {
            results,
            mean_deviation,
            max_deviation,
            fallbacks,
        })
    }
}
