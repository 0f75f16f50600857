mod linear;
mod spline;

pub use linear::{resample_polyline, ResampleTrack};
pub use spline::{ResampleSpline, ResampledSpline};
