pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod profile;

pub use error::{Result, TracklineError};
pub use operations::approximation::{smooth, ApproximationParams, SplineApproximation};
