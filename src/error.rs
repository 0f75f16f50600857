use thiserror::Error;

/// Top-level error type for track smoothing.
#[derive(Debug, Error)]
pub enum TracklineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Fit(#[from] FitError),
}

/// Errors caused by malformed arguments.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{what}: expected {expected} elements, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("parameter {parameter} = {value} is invalid: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("not enough points: {0}")]
    NotEnoughPoints(usize),
}

/// Errors related to the track geometry itself.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("point {index} coincides with its successor (zero-length segment)")]
    DuplicatePoint { index: usize },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors raised while fitting or querying the smoothing spline.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("insufficient points for spline degree: {points} points, degree {degree}")]
    InsufficientPoints { points: usize, degree: usize },

    #[error("unsupported spline degree {0} (odd degrees 1 to 5 are supported)")]
    UnsupportedDegree(usize),

    #[error("normal equations are not positive definite")]
    Singular,

    #[error("minimizer failed: {0}")]
    Minimizer(String),
}

/// Convenience type alias for results using [`TracklineError`].
pub type Result<T> = std::result::Result<T, TracklineError>;
