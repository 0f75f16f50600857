mod periodic_spline;

pub use periodic_spline::{FitPeriodicSpline, SplineFit};
